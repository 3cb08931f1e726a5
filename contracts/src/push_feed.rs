//! Push-oracle feed support.
//!
//! Alternate price backend: instead of an admin-set price table, an asset can
//! be mapped to a feed reference that relayers refresh by pushing signed
//! updates. A feed entry carries a price expressed as
//! `raw_price * 10^exponent`, which is rescaled here to the protocol's WAD
//! (18 fractional digits) representation. Reads require the entry's
//! `publish_time` to be within the freshness window.

use odra::prelude::*;
use odra::casper_types::U256;

/// Maximum age of a feed entry before reads fail, in time units
pub const FEED_FRESHNESS_WINDOW: u64 = 60;

/// One price observation pushed by a relayer.
#[odra::odra_type]
pub struct FeedEntry {
    /// Mantissa of the price
    pub raw_price: u64,
    /// Decimal exponent, typically negative (e.g. -8)
    pub exponent: i32,
    /// Publisher confidence interval, same scale as `raw_price`
    pub confidence: u64,
    /// Time the observation was published
    pub publish_time: u64,
}

/// Feed update payload accepted by `PriceOracle::update_feeds`.
#[odra::odra_type]
pub struct FeedUpdate {
    /// Feed reference the entry belongs to
    pub feed_id: String,
    /// The observation
    pub entry: FeedEntry,
}

/// Largest WAD shift (`exponent + 18`) whose result still fits in 256 bits
/// for any `u64` mantissa: `u64::MAX * 10^57 < 2^256`.
const MAX_WAD_SHIFT: i64 = 57;

/// Largest power of ten representable in 256 bits.
const MAX_POW10: i64 = 77;

/// Whether an exponent can be rescaled to WAD for every `u64` mantissa.
/// Entry points reject out-of-range exponents before storing an entry.
pub fn exponent_in_range(exponent: i32) -> bool {
    i64::from(exponent) + 18 <= MAX_WAD_SHIFT
}

/// Rescale `raw_price * 10^exponent` to WAD: multiply by `10^(exponent+18)`
/// when that shift is non-negative, otherwise integer-divide. `None` when the
/// result cannot be represented in 256 bits. The shift is computed in `i64`
/// so extreme exponents cannot overflow it.
pub fn scale_to_wad(raw_price: u64, exponent: i32) -> Option<U256> {
    let shift = i64::from(exponent) + 18;
    if shift > MAX_WAD_SHIFT {
        None
    } else if shift >= 0 {
        Some(U256::from(raw_price) * pow10(shift as u32))
    } else if -shift > MAX_POW10 {
        // divisor exceeds any u64 mantissa; the quotient is exactly zero
        Some(U256::zero())
    } else {
        Some(U256::from(raw_price) / pow10((-shift) as u32))
    }
}

/// Whether a feed entry published at `publish_time` is still usable at `now`.
pub fn is_fresh(publish_time: u64, now: u64) -> bool {
    now.saturating_sub(publish_time) <= FEED_FRESHNESS_WINDOW
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}
