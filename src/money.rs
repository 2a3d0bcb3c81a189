//! Fixed-point monetary arithmetic (spec §4.1)
//!
//! All stored premiums, limits and accumulator balances are
//! [`rust_decimal::Decimal`]. Floating point is never used for a stored or
//! compared monetary value; it appears only at API-surface serialization of
//! summary fields (spec §9).

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

/// Round to `places` fractional digits, half-up, matching Python's
/// `Decimal.quantize(..., rounding=ROUND_HALF_UP)` in the original pricing
/// engine.
pub fn round_half_up(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Division that yields zero rather than erroring when the divisor is zero
/// (spec §4.1: "division-by-zero ... yields zero, not an error").
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `max(a, b)` for decimals used by the admin-fee / TPA-fee floors (§4.4.4).
pub fn max(a: Decimal, b: Decimal) -> Decimal {
    if a >= b { a } else { b }
}
