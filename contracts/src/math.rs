//! Fixed-point pricing and collateralization math.
//!
//! All monetary values are WAD fixed-point (18 fractional digits); weights
//! are integer basis points out of 10000; ratios are WAD-scaled percentages
//! (1e18 = 100%, so 5e18 = 500%).

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::{CollateralRatio, Position, PositionHealth};

/// Fixed-point scale (1e18)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Basis points scale (10000 bps = 100%)
pub const BPS_SCALE: u32 = 10_000;

/// Minimum collateral ratio to open or increase debt (500%)
pub const MIN_MINT_RATIO: u128 = 5 * WAD;

/// Ratio below which a position becomes eligible for seizure (150%)
pub const LIQUIDATION_THRESHOLD: u128 = WAD + WAD / 2;

/// Default liquidation penalty in basis points (10%)
pub const DEFAULT_LIQUIDATION_PENALTY_BPS: u32 = 1_000;

/// Maximum configurable liquidation penalty in basis points (50%)
pub const MAX_LIQUIDATION_PENALTY_BPS: u32 = 5_000;

pub fn wad() -> U256 {
    U256::from(WAD)
}

/// Weighted composite price: `sum(price_i * weight_i) / 10000`.
///
/// The caller guarantees `prices.len() == weights.len()` and every price
/// non-zero; the oracle enforces both before calling in.
pub fn weighted_basket_price(prices: &[U256], weights: &[u32]) -> U256 {
    let mut acc = U256::zero();
    for (price, weight) in prices.iter().zip(weights.iter()) {
        acc = acc + *price * U256::from(*weight);
    }
    acc / U256::from(BPS_SCALE)
}

/// USD value of `amount` units priced at `price` (both WAD).
pub fn value_of(amount: U256, price: U256) -> U256 {
    amount * price / wad()
}

/// Unit amount equivalent to `value` USD at `price`. `price` must be
/// non-zero; the oracle rejects zero prices before conversion.
pub fn amount_from_value(value: U256, price: U256) -> U256 {
    value * wad() / price
}

/// Collateral ratio as a WAD percentage; infinite whenever there is no debt.
pub fn collateral_ratio(collateral_value: U256, debt_value: U256) -> CollateralRatio {
    if debt_value.is_zero() {
        CollateralRatio::Infinite
    } else {
        CollateralRatio::Finite(collateral_value * wad() / debt_value)
    }
}

/// Ratio check without division: `collateral_value / debt_value >= min_ratio`
/// computed multiplicatively so no rounding enters the invariant.
pub fn meets_ratio(collateral_value: U256, debt_value: U256, min_ratio: U256) -> bool {
    collateral_value * wad() >= debt_value * min_ratio
}

/// Collateral released for a partial debt repayment: `amount * collateral /
/// debt`, floor division. The residue stays with the position; a full
/// repayment releases everything, so nothing is stranded.
pub fn proportional_release(amount: U256, collateral: U256, debt: U256) -> U256 {
    amount * collateral / debt
}

/// Collateral seized for a partial liquidation: the proportional share
/// grossed up by the penalty, capped at the available collateral.
pub fn seizure_with_penalty(repay: U256, collateral: U256, debt: U256, penalty_bps: u32) -> U256 {
    let share = proportional_release(repay, collateral, debt);
    let seized = share * U256::from(BPS_SCALE + penalty_bps) / U256::from(BPS_SCALE);
    if seized > collateral {
        collateral
    } else {
        seized
    }
}

/// Spare debt headroom in basket tokens, floored at zero:
/// `(collateral_value / min_ratio - debt_value) / basket_price`.
pub fn max_mintable(
    collateral_value: U256,
    debt_value: U256,
    basket_price: U256,
    min_ratio: U256,
) -> U256 {
    let max_debt_value = collateral_value * wad() / min_ratio;
    if max_debt_value <= debt_value {
        return U256::zero();
    }
    (max_debt_value - debt_value) * wad() / basket_price
}

/// Classify a position by its ledger entry and current ratio.
pub fn classify(position: &Position, ratio: CollateralRatio) -> PositionHealth {
    if position.debt.is_zero() {
        if position.collateral.is_zero() {
            PositionHealth::Empty
        } else {
            PositionHealth::Funded
        }
    } else {
        match ratio {
            CollateralRatio::Infinite => PositionHealth::Healthy,
            CollateralRatio::Finite(ratio) => {
                if ratio < U256::from(LIQUIDATION_THRESHOLD) {
                    PositionHealth::Liquidatable
                } else if ratio < U256::from(MIN_MINT_RATIO) {
                    PositionHealth::AtRisk
                } else {
                    PositionHealth::Healthy
                }
            }
        }
    }
}
