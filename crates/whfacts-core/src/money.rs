//! Conversion of upstream minor-unit amounts into fixed-point money.
//!
//! The upstream API reports every monetary value as a number of minor
//! currency units (cents/kopecks). Stored money is in major units with
//! exactly 2 fractional digits, rounded half-up.

use rust_decimal::{Decimal, RoundingStrategy};

/// Converts a raw upstream amount (minor units, possibly absent) into a
/// [`Decimal`] of minor units. Absent or non-finite input is zero.
#[must_use]
pub fn minor_units(raw: Option<f64>) -> Decimal {
    raw.and_then(Decimal::from_f64_retain).unwrap_or(Decimal::ZERO)
}

/// Converts an amount of minor units into major units with 2 fractional
/// digits, rounding half-up (ties away from zero).
#[must_use]
pub fn to_major(minor: Decimal) -> Decimal {
    (minor / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
