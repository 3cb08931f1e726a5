//! Common types used across the basket protocol.

use odra::prelude::*;
use odra::casper_types::U256;

/// Basket identifier assigned by the registry (ids start at 1).
pub type BasketId = u64;

/// Interned asset identifier assigned by the oracle at registration time
/// (ids start at 1; 0 is never assigned).
pub type AssetId = u32;

/// Per-account, per-basket ledger entry.
///
/// Created implicitly on first deposit and never deleted, only zeroed.
/// `collateral` is denominated in settlement-asset units, `debt` in basket
/// tokens; both are WAD fixed-point (18 fractional digits).
#[odra::odra_type]
pub struct Position {
    /// Locked settlement-asset amount
    pub collateral: U256,
    /// Outstanding basket-token debt
    pub debt: U256,
}

impl Position {
    pub fn empty() -> Self {
        Self {
            collateral: U256::zero(),
            debt: U256::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.collateral.is_zero() && self.debt.is_zero()
    }
}

/// Unique position identifier.
///
/// Each position is exclusively owned by its `(account, basket_id)` key;
/// no position reads or writes another position's state.
#[odra::odra_type]
#[derive(Copy)]
pub struct PositionKey {
    /// Position owner
    pub account: Address,
    /// Basket the debt is denominated in
    pub basket_id: BasketId,
}

/// Collateral ratio as a WAD-scaled percentage (1e18 = 100%, 5e18 = 500%).
///
/// The `Infinite` variant replaces the max-integer sentinel of naive
/// implementations: whenever `debt == 0` the ratio is infinite, never a
/// finite number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateralRatio {
    /// No debt
    Infinite,
    /// WAD-scaled percentage
    Finite(U256),
}

impl CollateralRatio {
    /// Wire representation used by entry points: `None` means infinite.
    pub fn as_wad(&self) -> Option<U256> {
        match self {
            CollateralRatio::Infinite => None,
            CollateralRatio::Finite(ratio) => Some(*ratio),
        }
    }
}

/// Derived position classification.
#[odra::odra_type]
#[derive(Copy)]
pub enum PositionHealth {
    /// collateral = 0, debt = 0
    Empty,
    /// collateral > 0, debt = 0
    Funded,
    /// debt > 0, ratio >= 500%
    Healthy,
    /// debt > 0, 150% <= ratio < 500%
    AtRisk,
    /// debt > 0, ratio < 150%
    Liquidatable,
}

/// Who may invoke liquidation.
#[odra::odra_type]
#[derive(Copy)]
pub enum LiquidationPolicy {
    /// Any caller may liquidate an eligible position
    Permissionless,
    /// Only addresses on the vault's liquidator allowlist
    Allowlisted,
}

/// Position query result.
#[odra::odra_type]
pub struct PositionInfo {
    /// Ledger entry
    pub position: Position,
    /// Collateral valued in USD (WAD)
    pub collateral_value: U256,
    /// Debt valued in USD (WAD)
    pub debt_value: U256,
    /// WAD-scaled ratio; `None` means infinite (no debt)
    pub ratio: Option<U256>,
    /// Derived classification
    pub health: PositionHealth,
}
