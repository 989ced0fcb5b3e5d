//! Common utility functions for tax calculations.
//!
//! Shared rounding and arithmetic helpers used by the slab taxer, the regime
//! calculators and the summary builders.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to the nearest whole rupee, half away from zero.
///
/// Every figure the engine reports goes through this function exactly once,
/// at the point it is emitted.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_rupee;
///
/// assert_eq!(round_rupee(dec!(1234.49)), dec!(1234));
/// assert_eq!(round_rupee(dec!(1234.5)), dec!(1235));
/// assert_eq!(round_rupee(dec!(-1234.5)), dec!(-1235)); // Away from zero
/// ```
pub fn round_rupee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to a whole number, half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_percent;
///
/// assert_eq!(round_percent(dec!(25.5)), dec!(26));
/// assert_eq!(round_percent(dec!(29.4)), dec!(29));
/// ```
pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100), dec!(200)), dec!(200));
/// assert_eq!(max(dec!(-100), dec!(-200)), dec!(-100));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// `amount × rate / 100`, unrounded. `rate` is a percentage.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(250000), dec!(5)), dec!(12500));
/// ```
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Decimal {
    amount * rate / Decimal::ONE_HUNDRED
}

/// `amount × numerator / denominator`, or zero when the denominator is not
/// positive.
pub fn proportion(
    amount: Decimal,
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount * numerator / denominator
}
