//! Collateral Vault Contract
//!
//! Owns the per-account-per-basket position ledger and enforces
//! collateralization invariants across deposit, mint, burn, withdraw and
//! liquidation. Every mutating call is validated against the oracle's
//! current basket and settlement prices; any precondition failure aborts
//! the whole call with no partial state change.
//!
//! Position state machine:
//! `Empty -> Funded (collateral>0, debt=0) -> Indebted (debt>0)`; indebted
//! positions classify purely by ratio (Healthy >=500%, AtRisk 150-500%,
//! Liquidatable <150%). Liquidation returns a position to Empty; burning
//! all debt returns it to Funded.
//!
//! Ledger updates are committed before any outbound transfer
//! (check-effects-interactions) and a busy flag rejects reentrant calls.

use odra::prelude::*;
use odra::casper_types::{runtime_args, RuntimeArgs, U256, U512};
use odra::CallDef;
use crate::errors::ProtocolError;
use crate::math::{
    self, DEFAULT_LIQUIDATION_PENALTY_BPS, LIQUIDATION_THRESHOLD, MAX_LIQUIDATION_PENALTY_BPS,
    MIN_MINT_RATIO,
};
use crate::types::{
    BasketId, CollateralRatio, LiquidationPolicy, Position, PositionInfo, PositionKey,
};

/// Collateral Vault Contract
#[odra::module]
pub struct CollateralVault {
    /// Administrative capability
    admin: Var<Address>,
    /// Price oracle contract address
    oracle: Var<Address>,
    /// Basket registry contract address
    registry: Var<Address>,
    /// Position ledger keyed by (account, basket)
    positions: Mapping<PositionKey, Position>,
    /// Token sink per basket (mint/burn capability target)
    basket_tokens: Mapping<BasketId, Address>,
    /// Minimum ratio to open or increase debt (WAD percent)
    min_mint_ratio: Var<U256>,
    /// Ratio below which positions become liquidatable (WAD percent)
    liquidation_threshold: Var<U256>,
    /// Partial-liquidation penalty in bps
    liquidation_penalty_bps: Var<u32>,
    /// Who may liquidate
    liquidation_policy: Var<LiquidationPolicy>,
    /// Allowlist consulted under `LiquidationPolicy::Allowlisted`
    authorized_liquidators: Mapping<Address, bool>,
    /// Busy flag rejecting reentrant calls
    busy: Var<bool>,
    /// Total liquidations processed
    total_liquidations: Var<u64>,
    /// Total debt liquidated (cumulative)
    total_debt_liquidated: Var<U256>,
    /// Total collateral seized (cumulative)
    total_collateral_seized: Var<U256>,
}

#[odra::module]
impl CollateralVault {
    /// Initialize the vault
    pub fn init(&mut self, oracle: Address, registry: Address) {
        self.admin.set(self.env().caller());
        self.oracle.set(oracle);
        self.registry.set(registry);
        self.min_mint_ratio.set(U256::from(MIN_MINT_RATIO));
        self.liquidation_threshold.set(U256::from(LIQUIDATION_THRESHOLD));
        self.liquidation_penalty_bps.set(DEFAULT_LIQUIDATION_PENALTY_BPS);
        self.liquidation_policy.set(LiquidationPolicy::Permissionless);
        self.busy.set(false);
        self.total_liquidations.set(0);
        self.total_debt_liquidated.set(U256::zero());
        self.total_collateral_seized.set(U256::zero());
    }

    // ========== Position Operations ==========

    /// Lock settlement asset as collateral. The attached value must equal
    /// `amount`. Works for inactive baskets; the active flag gates minting
    /// only.
    #[odra(payable)]
    pub fn deposit_collateral(&mut self, basket_id: BasketId, amount: U256) {
        self.acquire_lock();

        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }
        if !self.registry_basket_exists(basket_id) {
            self.env().revert(ProtocolError::BasketDoesNotExist);
        }
        if self.env().attached_value() != u256_to_u512(amount) {
            self.env().revert(ProtocolError::PaymentMismatch);
        }

        let key = PositionKey {
            account: self.env().caller(),
            basket_id,
        };
        let mut position = self.position(&key);
        position.collateral = position.collateral + amount;
        self.positions.set(&key, position);

        self.release_lock();
    }

    /// Withdraw unlocked collateral. With outstanding debt the remaining
    /// collateral must still satisfy the minting ratio; otherwise the whole
    /// call fails (no partial withdrawal).
    pub fn withdraw_collateral(&mut self, basket_id: BasketId, amount: U256) {
        self.acquire_lock();

        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let caller = self.env().caller();
        let key = PositionKey {
            account: caller,
            basket_id,
        };
        let mut position = self.position(&key);
        if amount > position.collateral {
            self.env().revert(ProtocolError::InsufficientCollateral);
        }

        let new_collateral = position.collateral - amount;
        if !position.debt.is_zero() {
            let collateral_value = self.oracle_settlement_value(new_collateral);
            let debt_value = self.debt_value(basket_id, position.debt);
            if !math::meets_ratio(collateral_value, debt_value, self.get_min_mint_ratio()) {
                self.env().revert(ProtocolError::InsufficientCollateral);
            }
        }

        position.collateral = new_collateral;
        self.positions.set(&key, position);

        self.env().transfer_tokens(&caller, &u256_to_u512(amount));

        self.release_lock();
    }

    /// Mint basket tokens against the position's collateral. The basket must
    /// be active with a registered token sink, and the post-mint position
    /// must satisfy the minting ratio.
    pub fn mint(&mut self, basket_id: BasketId, amount: U256) {
        self.acquire_lock();

        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }
        if !self.registry_basket_exists(basket_id) {
            self.env().revert(ProtocolError::BasketDoesNotExist);
        }
        if !self.registry_basket_active(basket_id) {
            self.env().revert(ProtocolError::BasketNotActive);
        }
        let token = self.require_basket_token(basket_id);

        let caller = self.env().caller();
        let key = PositionKey {
            account: caller,
            basket_id,
        };
        let mut position = self.position(&key);

        let new_debt = position.debt + amount;
        let collateral_value = self.oracle_settlement_value(position.collateral);
        let debt_value = self.debt_value(basket_id, new_debt);
        if !math::meets_ratio(collateral_value, debt_value, self.get_min_mint_ratio()) {
            self.env().revert(ProtocolError::InsufficientCollateral);
        }

        position.debt = new_debt;
        self.positions.set(&key, position);

        self.token_mint(token, caller, amount);

        self.release_lock();
    }

    /// Repay debt and release collateral proportionally, preserving the
    /// pre-existing ratio for any remaining debt. Repaying in full releases
    /// all remaining collateral so no dust is stranded.
    pub fn burn(&mut self, basket_id: BasketId, amount: U256) {
        self.acquire_lock();

        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let caller = self.env().caller();
        let key = PositionKey {
            account: caller,
            basket_id,
        };
        let mut position = self.position(&key);
        if amount > position.debt {
            self.env().revert(ProtocolError::InsufficientDebt);
        }
        let token = self.require_basket_token(basket_id);

        let released = if amount == position.debt {
            position.collateral
        } else {
            math::proportional_release(amount, position.collateral, position.debt)
        };

        position.debt = position.debt - amount;
        position.collateral = position.collateral - released;
        self.positions.set(&key, position);

        self.token_burn(token, caller, amount);
        if !released.is_zero() {
            self.env().transfer_tokens(&caller, &u256_to_u512(released));
        }

        self.release_lock();
    }

    // ========== Liquidation ==========

    /// Check liquidation eligibility: outstanding debt with a ratio below
    /// the liquidation threshold. Always false when `debt == 0`.
    pub fn is_liquidatable(&self, account: Address, basket_id: BasketId) -> bool {
        let position = self.position(&PositionKey { account, basket_id });
        if position.debt.is_zero() {
            return false;
        }
        match self.ratio_of(basket_id, &position) {
            CollateralRatio::Infinite => false,
            CollateralRatio::Finite(ratio) => ratio < self.get_liquidation_threshold(),
        }
    }

    /// Seize a liquidatable position in full. The caller supplies at least
    /// the settlement-asset equivalent of the whole USD debt value, receives
    /// all of the position's collateral, and is refunded any excess payment.
    /// The position's collateral and debt are both zeroed. Basket tokens
    /// already minted remain in circulation: liquidation transfers the
    /// backing, not the tokens.
    ///
    /// Eligibility is re-checked here, so a stale off-chain `is_liquidatable`
    /// read can never liquidate a healthy position. Returns the seized
    /// collateral amount.
    #[odra(payable)]
    pub fn liquidate(&mut self, account: Address, basket_id: BasketId) -> U256 {
        self.acquire_lock();
        self.require_liquidator();

        let key = PositionKey { account, basket_id };
        let position = self.position(&key);
        if position.debt.is_zero() {
            self.env().revert(ProtocolError::NoDebtToLiquidate);
        }
        self.require_basket_token(basket_id);

        let collateral_value = self.oracle_settlement_value(position.collateral);
        let debt_value = self.debt_value(basket_id, position.debt);
        self.require_below_threshold(collateral_value, debt_value);

        let required = self.oracle_settlement_amount(debt_value);
        let attached = self.env().attached_value();
        if attached < u256_to_u512(required) {
            self.env().revert(ProtocolError::InsufficientPayment);
        }

        let seized = position.collateral;
        self.positions.set(&key, Position::empty());
        self.record_liquidation(position.debt, seized);

        let liquidator = self.env().caller();
        if !seized.is_zero() {
            self.env().transfer_tokens(&liquidator, &u256_to_u512(seized));
        }
        let excess = attached - u256_to_u512(required);
        if !excess.is_zero() {
            self.env().transfer_tokens(&liquidator, &excess);
        }

        self.release_lock();
        seized
    }

    /// Seize part of a liquidatable position. `debt_to_repay` is capped at
    /// the outstanding debt; the seized collateral is the proportional share
    /// grossed up by the penalty, capped at the available collateral. The
    /// caller supplies the settlement-asset equivalent of the repaid USD
    /// value and is refunded any excess. Returns the seized amount.
    #[odra(payable)]
    pub fn partial_liquidate(
        &mut self,
        account: Address,
        basket_id: BasketId,
        debt_to_repay: U256,
    ) -> U256 {
        self.acquire_lock();
        self.require_liquidator();

        if debt_to_repay.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let key = PositionKey { account, basket_id };
        let mut position = self.position(&key);
        if position.debt.is_zero() {
            self.env().revert(ProtocolError::NoDebtToLiquidate);
        }
        self.require_basket_token(basket_id);

        let collateral_value = self.oracle_settlement_value(position.collateral);
        let total_debt_value = self.debt_value(basket_id, position.debt);
        self.require_below_threshold(collateral_value, total_debt_value);

        let repay = if debt_to_repay > position.debt {
            position.debt
        } else {
            debt_to_repay
        };
        let seized = math::seizure_with_penalty(
            repay,
            position.collateral,
            position.debt,
            self.get_liquidation_penalty(),
        );

        let repay_value = self.debt_value(basket_id, repay);
        let required = self.oracle_settlement_amount(repay_value);
        let attached = self.env().attached_value();
        if attached < u256_to_u512(required) {
            self.env().revert(ProtocolError::InsufficientPayment);
        }

        position.debt = position.debt - repay;
        position.collateral = position.collateral - seized;
        self.positions.set(&key, position);
        self.record_liquidation(repay, seized);

        let liquidator = self.env().caller();
        if !seized.is_zero() {
            self.env().transfer_tokens(&liquidator, &u256_to_u512(seized));
        }
        let excess = attached - u256_to_u512(required);
        if !excess.is_zero() {
            self.env().transfer_tokens(&liquidator, &excess);
        }

        self.release_lock();
        seized
    }

    /// Settlement-asset payment a full liquidation of this position requires
    pub fn get_required_liquidation_payment(&self, account: Address, basket_id: BasketId) -> U256 {
        let position = self.position(&PositionKey { account, basket_id });
        if position.debt.is_zero() {
            return U256::zero();
        }
        let debt_value = self.debt_value(basket_id, position.debt);
        self.oracle_settlement_amount(debt_value)
    }

    // ========== Query Functions ==========

    /// Current collateral ratio as a WAD percentage; `None` means infinite
    /// (no debt), never a finite sentinel.
    pub fn get_collateral_ratio(&self, account: Address, basket_id: BasketId) -> Option<U256> {
        let position = self.position(&PositionKey { account, basket_id });
        if position.debt.is_zero() {
            return None;
        }
        self.ratio_of(basket_id, &position).as_wad()
    }

    /// Raw ledger entry for a position
    pub fn get_user_position(&self, account: Address, basket_id: BasketId) -> Position {
        self.position(&PositionKey { account, basket_id })
    }

    /// Position with derived values, ratio and health classification
    pub fn get_position_info(&self, account: Address, basket_id: BasketId) -> PositionInfo {
        let position = self.position(&PositionKey { account, basket_id });
        if position.is_empty() {
            let ratio = CollateralRatio::Infinite;
            let health = math::classify(&position, ratio);
            return PositionInfo {
                position,
                collateral_value: U256::zero(),
                debt_value: U256::zero(),
                ratio: ratio.as_wad(),
                health,
            };
        }

        let collateral_value = self.oracle_settlement_value(position.collateral);
        let debt_value = if position.debt.is_zero() {
            U256::zero()
        } else {
            self.debt_value(basket_id, position.debt)
        };
        let ratio = math::collateral_ratio(collateral_value, debt_value);
        let health = math::classify(&position, ratio);
        PositionInfo {
            position,
            collateral_value,
            debt_value,
            ratio: ratio.as_wad(),
            health,
        }
    }

    /// Basket tokens mintable before the position hits the minting ratio,
    /// floored at zero
    pub fn get_max_mintable(&self, account: Address, basket_id: BasketId) -> U256 {
        let position = self.position(&PositionKey { account, basket_id });
        let basket_price = self.oracle_basket_price(basket_id);
        let collateral_value = self.oracle_settlement_value(position.collateral);
        let debt_value = math::value_of(position.debt, basket_price);
        math::max_mintable(
            collateral_value,
            debt_value,
            basket_price,
            self.get_min_mint_ratio(),
        )
    }

    /// Token sink registered for a basket
    pub fn get_basket_token(&self, basket_id: BasketId) -> Option<Address> {
        self.basket_tokens.get(&basket_id)
    }

    /// Minimum ratio to open or increase debt (WAD percent)
    pub fn get_min_mint_ratio(&self) -> U256 {
        self.min_mint_ratio
            .get()
            .unwrap_or(U256::from(MIN_MINT_RATIO))
    }

    /// Liquidation eligibility threshold (WAD percent)
    pub fn get_liquidation_threshold(&self) -> U256 {
        self.liquidation_threshold
            .get()
            .unwrap_or(U256::from(LIQUIDATION_THRESHOLD))
    }

    /// Partial-liquidation penalty in bps
    pub fn get_liquidation_penalty(&self) -> u32 {
        self.liquidation_penalty_bps
            .get()
            .unwrap_or(DEFAULT_LIQUIDATION_PENALTY_BPS)
    }

    /// Current liquidation policy
    pub fn get_liquidation_policy(&self) -> LiquidationPolicy {
        self.liquidation_policy
            .get()
            .unwrap_or(LiquidationPolicy::Permissionless)
    }

    /// Cumulative liquidation statistics:
    /// (count, debt liquidated, collateral seized)
    pub fn get_liquidation_stats(&self) -> (u64, U256, U256) {
        (
            self.total_liquidations.get().unwrap_or(0),
            self.total_debt_liquidated.get().unwrap_or(U256::zero()),
            self.total_collateral_seized.get().unwrap_or(U256::zero()),
        )
    }

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    // ========== Admin Functions ==========

    /// Register the token sink for a basket (admin only)
    pub fn register_basket_token(&mut self, basket_id: BasketId, token: Address) {
        self.require_admin();
        if !self.registry_basket_exists(basket_id) {
            self.env().revert(ProtocolError::BasketDoesNotExist);
        }
        self.basket_tokens.set(&basket_id, token);
    }

    /// Set the partial-liquidation penalty (admin only, max 50%)
    pub fn set_liquidation_penalty(&mut self, penalty_bps: u32) {
        self.require_admin();
        if penalty_bps > MAX_LIQUIDATION_PENALTY_BPS {
            self.env().revert(ProtocolError::InvalidConfig);
        }
        self.liquidation_penalty_bps.set(penalty_bps);
    }

    /// Switch between permissionless and allowlisted liquidation (admin only)
    pub fn set_liquidation_policy(&mut self, policy: LiquidationPolicy) {
        self.require_admin();
        self.liquidation_policy.set(policy);
    }

    /// Grant or revoke a liquidator allowlist entry (admin only)
    pub fn set_authorized_liquidator(&mut self, liquidator: Address, authorized: bool) {
        self.require_admin();
        self.authorized_liquidators.set(&liquidator, authorized);
    }

    /// Transfer admin to a new address (admin only)
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.admin.set(new_admin);
    }

    // ========== Internal Functions ==========

    fn position(&self, key: &PositionKey) -> Position {
        self.positions.get(key).unwrap_or_else(Position::empty)
    }

    fn ratio_of(&self, basket_id: BasketId, position: &Position) -> CollateralRatio {
        let collateral_value = self.oracle_settlement_value(position.collateral);
        let debt_value = self.debt_value(basket_id, position.debt);
        math::collateral_ratio(collateral_value, debt_value)
    }

    fn debt_value(&self, basket_id: BasketId, debt: U256) -> U256 {
        let basket_price = self.oracle_basket_price(basket_id);
        math::value_of(debt, basket_price)
    }

    fn require_below_threshold(&self, collateral_value: U256, debt_value: U256) {
        // meets_ratio(threshold) == ratio >= threshold == not liquidatable
        if math::meets_ratio(collateral_value, debt_value, self.get_liquidation_threshold()) {
            self.env().revert(ProtocolError::PositionNotLiquidatable);
        }
    }

    fn record_liquidation(&mut self, debt: U256, seized: U256) {
        self.total_liquidations
            .set(self.total_liquidations.get().unwrap_or(0) + 1);
        self.total_debt_liquidated
            .set(self.total_debt_liquidated.get().unwrap_or(U256::zero()) + debt);
        self.total_collateral_seized
            .set(self.total_collateral_seized.get().unwrap_or(U256::zero()) + seized);
    }

    fn require_basket_token(&self, basket_id: BasketId) -> Address {
        match self.basket_tokens.get(&basket_id) {
            Some(token) => token,
            None => self.env().revert(ProtocolError::BasketTokenNotRegistered),
        }
    }

    fn require_liquidator(&self) {
        if let LiquidationPolicy::Allowlisted = self.get_liquidation_policy() {
            let caller = self.env().caller();
            if !self.authorized_liquidators.get(&caller).unwrap_or(false) {
                self.env().revert(ProtocolError::NotAuthorizedLiquidator);
            }
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        let is_admin = self.admin.get().map_or(false, |admin| admin == caller);
        if !is_admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn acquire_lock(&mut self) {
        if self.busy.get().unwrap_or(false) {
            self.env().revert(ProtocolError::ReentrantCall);
        }
        self.busy.set(true);
    }

    fn release_lock(&mut self) {
        self.busy.set(false);
    }

    // ========== Cross-Contract Calls ==========

    fn registry_basket_exists(&self, basket_id: BasketId) -> bool {
        let registry = self.require_registry();
        let args = runtime_args! {
            "basket_id" => basket_id
        };
        let call_def = CallDef::new("basket_exists", false, args);
        self.env().call_contract(registry, call_def)
    }

    fn registry_basket_active(&self, basket_id: BasketId) -> bool {
        let registry = self.require_registry();
        let args = runtime_args! {
            "basket_id" => basket_id
        };
        let call_def = CallDef::new("is_basket_active", false, args);
        self.env().call_contract(registry, call_def)
    }

    fn oracle_basket_price(&self, basket_id: BasketId) -> U256 {
        let oracle = self.require_oracle();
        let args = runtime_args! {
            "basket_id" => basket_id
        };
        let call_def = CallDef::new("get_basket_price", false, args);
        self.env().call_contract(oracle, call_def)
    }

    fn oracle_settlement_value(&self, amount: U256) -> U256 {
        let oracle = self.require_oracle();
        let args = runtime_args! {
            "amount" => amount
        };
        let call_def = CallDef::new("settlement_value", false, args);
        self.env().call_contract(oracle, call_def)
    }

    fn oracle_settlement_amount(&self, value: U256) -> U256 {
        let oracle = self.require_oracle();
        let args = runtime_args! {
            "value" => value
        };
        let call_def = CallDef::new("settlement_amount_from_value", false, args);
        self.env().call_contract(oracle, call_def)
    }

    fn token_mint(&self, token: Address, to: Address, amount: U256) {
        let args = runtime_args! {
            "to" => to,
            "amount" => amount
        };
        let call_def = CallDef::new("mint", true, args);
        self.env().call_contract::<()>(token, call_def);
    }

    fn token_burn(&self, token: Address, from: Address, amount: U256) {
        let args = runtime_args! {
            "from" => from,
            "amount" => amount
        };
        let call_def = CallDef::new("burn_from", true, args);
        self.env().call_contract::<()>(token, call_def);
    }

    fn require_oracle(&self) -> Address {
        match self.oracle.get() {
            Some(oracle) => oracle,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn require_registry(&self) -> Address {
        match self.registry.get() {
            Some(registry) => registry,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }
}

// ===== Helper Functions =====

/// Convert U256 to U512 for native-token transfers
fn u256_to_u512(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}
