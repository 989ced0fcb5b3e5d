//! Surcharge and health & education cess.

use rust_decimal::Decimal;

use crate::calculations::common::{percent_of, round_rupee};
use crate::models::SurchargeBand;

/// Surcharge on `tax` for a taxpayer with `total_income`.
///
/// The band whose inclusive range contains `total_income` supplies one flat
/// rate applied to the whole of `tax`; the surcharge is not marginal. Income
/// outside every band carries no surcharge.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::surcharge;
/// use tax_core::TaxRules;
///
/// let bands = TaxRules::fy_2025_26().surcharge_bands;
///
/// assert_eq!(surcharge(dec!(4000000), dec!(900000), &bands), dec!(0));
/// assert_eq!(surcharge(dec!(6000000), dec!(1597499), &bands), dec!(159750));
/// ```
pub fn surcharge(
    total_income: Decimal,
    tax: Decimal,
    bands: &[SurchargeBand],
) -> Decimal {
    bands
        .iter()
        .find(|band| band.contains(total_income))
        .map(|band| round_rupee(percent_of(tax, band.rate)))
        .unwrap_or(Decimal::ZERO)
}

/// Cess at `rate` percent on tax plus surcharge, rounded.
pub fn cess(
    tax_plus_surcharge: Decimal,
    rate: Decimal,
) -> Decimal {
    round_rupee(percent_of(tax_plus_surcharge, rate))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxRules;

    fn bands() -> Vec<SurchargeBand> {
        TaxRules::fy_2025_26().surcharge_bands
    }

    // =========================================================================
    // surcharge tests
    // =========================================================================

    #[test]
    fn no_surcharge_below_first_band() {
        assert_eq!(surcharge(dec!(4999999), dec!(1000000), &bands()), dec!(0));
    }

    #[test]
    fn first_band_starts_inclusive() {
        assert_eq!(surcharge(dec!(5000000), dec!(100000), &bands()), dec!(10000));
    }

    #[test]
    fn band_ceiling_is_inclusive() {
        assert_eq!(surcharge(dec!(10000000), dec!(100000), &bands()), dec!(10000));
        assert_eq!(surcharge(dec!(10000001), dec!(100000), &bands()), dec!(15000));
    }

    #[test]
    fn top_band_is_unbounded() {
        assert_eq!(surcharge(dec!(90000000), dec!(100000), &bands()), dec!(37000));
    }

    #[test]
    fn surcharge_is_rounded() {
        // 1357499 × 10% = 135749.9
        assert_eq!(surcharge(dec!(6000000), dec!(1357499), &bands()), dec!(135750));
    }

    #[test]
    fn no_bands_means_no_surcharge() {
        assert_eq!(surcharge(dec!(90000000), dec!(100000), &[]), dec!(0));
    }

    // =========================================================================
    // cess tests
    // =========================================================================

    #[test]
    fn cess_is_four_percent() {
        assert_eq!(cess(dec!(10000), dec!(4)), dec!(400));
    }

    #[test]
    fn cess_is_rounded() {
        // 191099 × 4% = 7643.96
        assert_eq!(cess(dec!(191099), dec!(4)), dec!(7644));
    }

    #[test]
    fn cess_on_zero_is_zero() {
        assert_eq!(cess(dec!(0), dec!(4)), dec!(0));
    }
}
