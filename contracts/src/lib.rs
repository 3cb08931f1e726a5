//! Synthetic Basket Protocol Contracts
//!
//! Mint synthetic tokens tracking weighted baskets of external asset prices,
//! collateralized by the chain's native settlement asset.
//!
//! ## Architecture
//!
//! - **BasketRegistry**: Basket definitions (constituents + bps weights)
//! - **PriceOracle**: Per-asset and settlement-asset USD prices, weighted
//!   basket pricing, push-feed ingestion with freshness checks
//! - **BasketToken**: Per-basket token with vault-gated mint/burn
//! - **CollateralVault**: Position ledger; deposit, mint, burn, withdraw
//!   and liquidation with ratio enforcement
//!
//! ## Collateralization
//!
//! All monetary values are WAD (1e18) fixed-point USD. Opening or growing
//! debt requires a 500% collateral ratio; positions below 150% are
//! liquidatable. Ratio checks are multiplicative so no intermediate
//! division loses precision.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod math;
pub mod push_feed;

// Contract modules
pub mod basket_registry;
pub mod price_oracle;
pub mod basket_token;
pub mod collateral_vault;

// Re-export main types for convenience
pub use basket_registry::BasketRegistry;
pub use basket_token::BasketToken;
pub use collateral_vault::CollateralVault;
pub use errors::ProtocolError;
pub use price_oracle::PriceOracle;
pub use types::{
    AssetId, BasketId, CollateralRatio, LiquidationPolicy, Position, PositionHealth, PositionInfo,
};
