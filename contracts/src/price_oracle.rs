//! Price Oracle Contract
//!
//! Single source of truth for USD pricing across the protocol:
//! - Per-asset price store, WAD scaled (1e18); zero means "unavailable"
//! - Settlement-asset price for valuing collateral and liquidation payments
//! - Weighted composite basket pricing from the registry's composition
//! - Optional push-feed backend per asset with a 60-unit freshness window
//!
//! Asset symbols are interned into small integer ids at registration time;
//! the registration list stays enumerable for discovery.

use odra::prelude::*;
use odra::casper_types::{runtime_args, RuntimeArgs, U256, U512};
use odra::CallDef;
use crate::errors::ProtocolError;
use crate::math::weighted_basket_price;
use crate::push_feed::{self, FeedEntry, FeedUpdate};
use crate::types::{AssetId, BasketId};

/// Default fee per pushed feed entry, in motes
const DEFAULT_FEED_UPDATE_FEE: u64 = 1;

/// Price Oracle Contract
#[odra::module]
pub struct PriceOracle {
    /// Administrative capability
    admin: Var<Address>,
    /// Basket registry contract address
    registry: Var<Address>,
    /// Interned symbol -> asset id (ids start at 1)
    asset_ids: Mapping<String, AssetId>,
    /// Enumerable registration list: asset id -> symbol
    asset_symbols: Mapping<AssetId, String>,
    /// Number of registered assets
    asset_count: Var<AssetId>,
    /// Direct price store, WAD scaled
    prices: Mapping<AssetId, U256>,
    /// Settlement-asset USD price, WAD scaled (0 = not set)
    settlement_price: Var<U256>,
    /// Optional push-feed reference per asset
    feed_ids: Mapping<AssetId, String>,
    /// Last pushed entry per feed reference
    feeds: Mapping<String, FeedEntry>,
    /// Fee charged per pushed feed entry
    feed_update_fee: Var<U512>,
}

#[odra::module]
impl PriceOracle {
    /// Initialize the oracle
    pub fn init(&mut self, registry: Address) {
        self.admin.set(self.env().caller());
        self.registry.set(registry);
        self.asset_count.set(0);
        self.settlement_price.set(U256::zero());
        self.feed_update_fee.set(U512::from(DEFAULT_FEED_UPDATE_FEE));
    }

    // ========== Price Administration ==========

    /// Register a new asset with an initial price (admin only).
    /// Rejects duplicates; use `set_asset_price` to update known assets.
    pub fn register_asset(&mut self, asset: String, price: U256) {
        self.require_admin();
        if price.is_zero() {
            self.env().revert(ProtocolError::ZeroPrice);
        }
        if self.asset_ids.get(&asset).is_some() {
            self.env().revert(ProtocolError::AssetAlreadyRegistered);
        }
        let asset_id = self.intern_asset(&asset);
        self.prices.set(&asset_id, price);
    }

    /// Set an asset price, auto-registering unknown symbols (admin only)
    pub fn set_asset_price(&mut self, asset: String, price: U256) {
        self.require_admin();
        if price.is_zero() {
            self.env().revert(ProtocolError::ZeroPrice);
        }
        let asset_id = match self.asset_ids.get(&asset) {
            Some(asset_id) => asset_id,
            None => self.intern_asset(&asset),
        };
        self.prices.set(&asset_id, price);
    }

    /// Update the settlement-asset price (admin only)
    pub fn set_settlement_price(&mut self, price: U256) {
        self.require_admin();
        if price.is_zero() {
            self.env().revert(ProtocolError::ZeroPrice);
        }
        self.settlement_price.set(price);
    }

    // ========== Price Query Functions ==========

    /// Get a single asset's USD price (WAD)
    pub fn get_asset_price(&self, asset: String) -> U256 {
        let asset_id = match self.asset_ids.get(&asset) {
            Some(asset_id) => asset_id,
            None => self.env().revert(ProtocolError::AssetNotRegistered),
        };
        match self.lookup_price(asset_id) {
            Ok(price) => price,
            Err(error) => self.env().revert(error),
        }
    }

    /// Get a basket's weighted composite USD price (WAD).
    ///
    /// Reads the composition from the registry; fails if the basket does not
    /// exist or any constituent price is unavailable. This is the single
    /// price consumed by the vault and by any trading venue, so solvency
    /// math and trade pricing cannot drift apart.
    pub fn get_basket_price(&self, basket_id: BasketId) -> U256 {
        let (assets, weights) = self.fetch_composition(basket_id);

        let mut prices = Vec::new();
        for asset in &assets {
            let asset_id = match self.asset_ids.get(asset) {
                Some(asset_id) => asset_id,
                None => self.env().revert(ProtocolError::AssetPriceNotAvailable),
            };
            match self.lookup_price(asset_id) {
                Ok(price) => prices.push(price),
                Err(error) => self.env().revert(error),
            }
        }

        weighted_basket_price(&prices, &weights)
    }

    /// USD value (WAD) of a settlement-asset amount
    pub fn settlement_value(&self, amount: U256) -> U256 {
        let price = self.require_settlement_price();
        crate::math::value_of(amount, price)
    }

    /// Settlement-asset amount equivalent to a USD value (WAD)
    pub fn settlement_amount_from_value(&self, value: U256) -> U256 {
        let price = self.require_settlement_price();
        crate::math::amount_from_value(value, price)
    }

    /// Check every constituent price ahead of minting. Returns `(true, None)`
    /// when the basket is fully priced, otherwise the first failing symbol.
    pub fn validate_basket_prices(&self, basket_id: BasketId) -> (bool, Option<String>) {
        let (assets, _weights) = self.fetch_composition(basket_id);
        for asset in assets {
            let available = self
                .asset_ids
                .get(&asset)
                .map(|asset_id| self.lookup_price(asset_id).is_ok())
                .unwrap_or(false);
            if !available {
                return (false, Some(asset));
            }
        }
        (true, None)
    }

    /// Get the settlement-asset price (0 = not set)
    pub fn get_settlement_price(&self) -> U256 {
        self.settlement_price.get().unwrap_or(U256::zero())
    }

    // ========== Push-Feed Backend ==========

    /// Map an asset to a push-feed reference (admin only). The asset is
    /// interned if unknown; subsequent reads resolve through the feed
    /// instead of the direct price store.
    pub fn set_asset_feed(&mut self, asset: String, feed_id: String) {
        self.require_admin();
        let asset_id = match self.asset_ids.get(&asset) {
            Some(asset_id) => asset_id,
            None => self.intern_asset(&asset),
        };
        self.feed_ids.set(&asset_id, feed_id);
    }

    /// Push fresh feed entries. Costs `feed_update_fee` per entry, paid from
    /// the attached value; any excess is refunded to the caller. Entries
    /// whose exponent cannot be rescaled to WAD are rejected outright so a
    /// stored entry can never poison reads for the mapped asset.
    #[odra(payable)]
    pub fn update_feeds(&mut self, updates: Vec<FeedUpdate>) {
        if updates.is_empty() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let fee = self.get_feed_update_fee() * U512::from(updates.len() as u64);
        let attached = self.env().attached_value();
        if attached < fee {
            self.env().revert(ProtocolError::InsufficientPayment);
        }

        for update in updates {
            if !push_feed::exponent_in_range(update.entry.exponent) {
                self.env().revert(ProtocolError::ExponentOutOfRange);
            }
            self.feeds.set(&update.feed_id, update.entry);
        }

        let excess = attached - fee;
        if !excess.is_zero() {
            let caller = self.env().caller();
            self.env().transfer_tokens(&caller, &excess);
        }
    }

    /// Set the per-entry feed update fee (admin only)
    pub fn set_feed_update_fee(&mut self, fee: U512) {
        self.require_admin();
        self.feed_update_fee.set(fee);
    }

    /// Get the per-entry feed update fee
    pub fn get_feed_update_fee(&self) -> U512 {
        self.feed_update_fee
            .get()
            .unwrap_or(U512::from(DEFAULT_FEED_UPDATE_FEE))
    }

    /// Get the last pushed entry for a feed reference
    pub fn get_feed(&self, feed_id: String) -> Option<FeedEntry> {
        self.feeds.get(&feed_id)
    }

    // ========== Asset Discovery ==========

    /// Number of registered assets
    pub fn get_asset_count(&self) -> AssetId {
        self.asset_count.get().unwrap_or(0)
    }

    /// Symbol for an interned asset id
    pub fn get_asset_symbol(&self, asset_id: AssetId) -> Option<String> {
        self.asset_symbols.get(&asset_id)
    }

    /// Interned id for a symbol
    pub fn get_asset_id(&self, asset: String) -> Option<AssetId> {
        self.asset_ids.get(&asset)
    }

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Transfer admin to a new address (admin only)
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.admin.set(new_admin);
    }

    // ========== Internal Functions ==========

    /// Resolve an asset's price: through its feed when one is mapped
    /// (freshness-checked and rescaled to WAD), else the direct store.
    fn lookup_price(&self, asset_id: AssetId) -> Result<U256, ProtocolError> {
        if let Some(feed_id) = self.feed_ids.get(&asset_id) {
            let entry = match self.feeds.get(&feed_id) {
                Some(entry) => entry,
                None => return Err(ProtocolError::AssetPriceNotAvailable),
            };
            if !push_feed::is_fresh(entry.publish_time, self.env().get_block_time()) {
                return Err(ProtocolError::StalePrice);
            }
            match push_feed::scale_to_wad(entry.raw_price, entry.exponent) {
                Some(price) if !price.is_zero() => Ok(price),
                _ => Err(ProtocolError::AssetPriceNotAvailable),
            }
        } else {
            let price = self.prices.get(&asset_id).unwrap_or(U256::zero());
            if price.is_zero() {
                return Err(ProtocolError::AssetPriceNotAvailable);
            }
            Ok(price)
        }
    }

    fn intern_asset(&mut self, asset: &String) -> AssetId {
        let asset_id = self.asset_count.get().unwrap_or(0) + 1;
        self.asset_count.set(asset_id);
        self.asset_ids.set(asset, asset_id);
        self.asset_symbols.set(&asset_id, asset.clone());
        asset_id
    }

    fn fetch_composition(&self, basket_id: BasketId) -> (Vec<String>, Vec<u32>) {
        let registry = match self.registry.get() {
            Some(registry) => registry,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };

        let exists_args = runtime_args! {
            "basket_id" => basket_id
        };
        let exists_call = CallDef::new("basket_exists", false, exists_args);
        let exists: bool = self.env().call_contract(registry, exists_call);
        if !exists {
            self.env().revert(ProtocolError::BasketDoesNotExist);
        }

        let composition_args = runtime_args! {
            "basket_id" => basket_id
        };
        let composition_call = CallDef::new("get_composition", false, composition_args);
        self.env().call_contract(registry, composition_call)
    }

    fn require_settlement_price(&self) -> U256 {
        let price = self.settlement_price.get().unwrap_or(U256::zero());
        if price.is_zero() {
            self.env().revert(ProtocolError::PriceNotSet);
        }
        price
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        let is_admin = self.admin.get().map_or(false, |admin| admin == caller);
        if !is_admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}
