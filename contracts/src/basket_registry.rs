//! Basket registry contract.
//!
//! CRUD metadata store for basket compositions. A basket is an ordered list
//! of (asset symbol, weight) pairs; weights are basis points that must sum to
//! exactly 10000 with every weight positive. Compositions are immutable once
//! created; an independent active flag gates only new minting, never existing
//! positions.

use odra::prelude::*;
use crate::errors::ProtocolError;
use crate::math::BPS_SCALE;
use crate::types::BasketId;

/// Basket metadata
#[odra::odra_type]
pub struct BasketMeta {
    /// Display name
    pub name: String,
    /// Account that created the basket
    pub creator: Address,
    /// Number of constituent assets
    pub asset_count: u32,
    /// Whether new minting is allowed
    pub is_active: bool,
}

/// Basket Registry Contract
#[odra::module]
pub struct BasketRegistry {
    /// Number of baskets created (ids start at 1)
    basket_count: Var<u64>,
    /// Basket metadata by id
    baskets: Mapping<BasketId, BasketMeta>,
    /// Constituent symbol by (basket, index)
    basket_assets: Mapping<(BasketId, u32), String>,
    /// Constituent weight in bps by (basket, index)
    basket_weights: Mapping<(BasketId, u32), u32>,
}

#[odra::module]
impl BasketRegistry {
    /// Initialize the registry
    pub fn init(&mut self) {
        self.basket_count.set(0);
    }

    /// Create a new basket. Returns the new basket id.
    ///
    /// Weights are validated here and never again: every weight must be
    /// positive and the sum must be exactly 10000 bps.
    pub fn create_basket(
        &mut self,
        name: String,
        assets: Vec<String>,
        weights: Vec<u32>,
    ) -> BasketId {
        if assets.len() != weights.len() {
            self.env().revert(ProtocolError::ArrayLengthMismatch);
        }

        let mut weight_sum: u64 = 0;
        for weight in &weights {
            if *weight == 0 {
                self.env().revert(ProtocolError::ZeroWeight);
            }
            weight_sum += u64::from(*weight);
        }
        if weight_sum != u64::from(BPS_SCALE) {
            self.env().revert(ProtocolError::InvalidWeightsSum);
        }

        let basket_id = self.basket_count.get().unwrap_or(0) + 1;
        self.basket_count.set(basket_id);

        for (index, (asset, weight)) in assets.iter().zip(weights.iter()).enumerate() {
            let key = (basket_id, index as u32);
            self.basket_assets.set(&key, asset.clone());
            self.basket_weights.set(&key, *weight);
        }

        self.baskets.set(
            &basket_id,
            BasketMeta {
                name,
                creator: self.env().caller(),
                asset_count: assets.len() as u32,
                is_active: true,
            },
        );

        basket_id
    }

    /// Enable or disable minting for a basket (creator only).
    ///
    /// Existing positions are unaffected; the flag gates new minting only.
    pub fn set_basket_active(&mut self, basket_id: BasketId, active: bool) {
        let mut meta = match self.baskets.get(&basket_id) {
            Some(meta) => meta,
            None => self.env().revert(ProtocolError::BasketDoesNotExist),
        };
        if meta.creator != self.env().caller() {
            self.env().revert(ProtocolError::NotBasketCreator);
        }
        meta.is_active = active;
        self.baskets.set(&basket_id, meta);
    }

    // ========== Query Functions ==========

    /// Check whether a basket exists
    pub fn basket_exists(&self, basket_id: BasketId) -> bool {
        self.baskets.get(&basket_id).is_some()
    }

    /// Check whether a basket accepts new minting
    pub fn is_basket_active(&self, basket_id: BasketId) -> bool {
        self.baskets
            .get(&basket_id)
            .map(|meta| meta.is_active)
            .unwrap_or(false)
    }

    /// Get a basket's ordered (symbols, weights) composition
    pub fn get_composition(&self, basket_id: BasketId) -> (Vec<String>, Vec<u32>) {
        let meta = match self.baskets.get(&basket_id) {
            Some(meta) => meta,
            None => self.env().revert(ProtocolError::BasketDoesNotExist),
        };

        let mut assets = Vec::new();
        let mut weights = Vec::new();
        for index in 0..meta.asset_count {
            let key = (basket_id, index);
            if let Some(asset) = self.basket_assets.get(&key) {
                assets.push(asset);
                weights.push(self.basket_weights.get(&key).unwrap_or(0));
            }
        }
        (assets, weights)
    }

    /// Get basket metadata
    pub fn get_basket(&self, basket_id: BasketId) -> Option<BasketMeta> {
        self.baskets.get(&basket_id)
    }

    /// Get the number of baskets created
    pub fn get_basket_count(&self) -> u64 {
        self.basket_count.get().unwrap_or(0)
    }
}
