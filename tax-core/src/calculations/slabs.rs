//! Progressive slab tax.

use rust_decimal::Decimal;

use crate::calculations::common::{percent_of, round_rupee};
use crate::models::TaxSlab;

/// Applies a progressive slab table to `taxable_income`.
///
/// Slabs are walked in ascending order until one starts above the income.
/// Each slab contributes `(upper - min) × rate / 100`, where `upper` is the
/// smaller of the slab's ceiling and the income. The sum is rounded to the
/// nearest rupee once, at the end.
///
/// The table is trusted as given; [`TaxRules::validate`](crate::TaxRules::validate)
/// is where malformed tables are rejected.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::tax_by_slabs;
/// use tax_core::TaxRules;
///
/// let rules = TaxRules::fy_2025_26();
///
/// assert_eq!(tax_by_slabs(dec!(300000), &rules.old_regime.slabs), dec!(2500));
/// assert_eq!(tax_by_slabs(dec!(500000), &rules.new_regime.slabs), dec!(5000));
/// ```
pub fn tax_by_slabs(
    taxable_income: Decimal,
    slabs: &[TaxSlab],
) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    for slab in slabs {
        if taxable_income < slab.min {
            break;
        }

        let upper = match slab.max {
            Some(max) if max < taxable_income => max,
            _ => taxable_income,
        };
        let portion = upper - slab.min;
        if portion > Decimal::ZERO {
            tax += percent_of(portion, slab.rate);
        }
    }

    round_rupee(tax)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use std::collections::BTreeSet;

    use super::*;
    use crate::TaxRules;

    fn old_slabs() -> Vec<TaxSlab> {
        TaxRules::fy_2025_26().old_regime.slabs
    }

    fn new_slabs() -> Vec<TaxSlab> {
        TaxRules::fy_2025_26().new_regime.slabs
    }

    // =========================================================================
    // Boundary tests
    // =========================================================================

    #[test]
    fn zero_income_has_no_tax() {
        assert_eq!(tax_by_slabs(dec!(0), &old_slabs()), dec!(0));
    }

    #[test]
    fn negative_income_has_no_tax() {
        assert_eq!(tax_by_slabs(dec!(-5000), &new_slabs()), dec!(0));
    }

    #[test]
    fn empty_table_has_no_tax() {
        assert_eq!(tax_by_slabs(dec!(500000), &[]), dec!(0));
    }

    #[test]
    fn income_inside_nil_slab_has_no_tax() {
        assert_eq!(tax_by_slabs(dec!(250000), &old_slabs()), dec!(0));
        assert_eq!(tax_by_slabs(dec!(400000), &new_slabs()), dec!(0));
    }

    #[test]
    fn income_at_offset_slab_minimum_has_no_tax() {
        // 250001 is the slab minimum, so the 5% portion is empty.
        assert_eq!(tax_by_slabs(dec!(250001), &old_slabs()), dec!(0));
    }

    // =========================================================================
    // Old regime tests
    // =========================================================================

    #[test]
    fn old_regime_second_slab() {
        // (300000 - 250001) × 5% = 2499.95
        assert_eq!(tax_by_slabs(dec!(300000), &old_slabs()), dec!(2500));
    }

    #[test]
    fn old_regime_top_of_second_slab() {
        assert_eq!(tax_by_slabs(dec!(450000), &old_slabs()), dec!(10000));
    }

    #[test]
    fn old_regime_third_slab() {
        // 12499.95 + (800000 - 500001) × 20% = 12499.95 + 59999.80
        assert_eq!(tax_by_slabs(dec!(800000), &old_slabs()), dec!(72500));
    }

    #[test]
    fn old_regime_top_slab() {
        // 12499.95 + 99999.80 + (1262000 - 1000001) × 30% = 191099.45
        assert_eq!(tax_by_slabs(dec!(1262000), &old_slabs()), dec!(191099));
    }

    // =========================================================================
    // New regime tests
    // =========================================================================

    #[test]
    fn new_regime_second_slab() {
        // (500000 - 400001) × 5% = 4999.95
        assert_eq!(tax_by_slabs(dec!(500000), &new_slabs()), dec!(5000));
    }

    #[test]
    fn new_regime_fourth_slab() {
        // 19999.95 + 39999.90 + (1237000 - 1200001) × 15% = 65549.70
        assert_eq!(tax_by_slabs(dec!(1237000), &new_slabs()), dec!(65550));
    }

    #[test]
    fn new_regime_top_slab() {
        // 19999.95 + 39999.90 + 59999.85 + 79999.80 + 99999.75
        //   + (5925000 - 2400001) × 30% = 1357498.95
        assert_eq!(tax_by_slabs(dec!(5925000), &new_slabs()), dec!(1357499));
    }

    // =========================================================================
    // Monotonicity
    // =========================================================================

    /// Incomes from 0 to 30 lakh in 5000 steps, plus every slab edge and its
    /// neighbours.
    fn income_ladder(slabs: &[TaxSlab]) -> Vec<Decimal> {
        let mut incomes: BTreeSet<Decimal> =
            (0..=600).map(|step| Decimal::from(step * 5000)).collect();
        for slab in slabs {
            for edge in [Some(slab.min), slab.max].into_iter().flatten() {
                incomes.extend([edge - Decimal::ONE, edge, edge + Decimal::ONE]);
            }
        }
        incomes.into_iter().collect()
    }

    fn assert_never_decreases(slabs: &[TaxSlab]) {
        let incomes = income_ladder(slabs);
        for pair in incomes.windows(2) {
            let lower = tax_by_slabs(pair[0], slabs);
            let higher = tax_by_slabs(pair[1], slabs);
            assert!(
                higher >= lower,
                "tax fell from {lower} at {} to {higher} at {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn old_regime_tax_never_decreases_with_income() {
        assert_never_decreases(&old_slabs());
    }

    #[test]
    fn new_regime_tax_never_decreases_with_income() {
        assert_never_decreases(&new_slabs());
    }
}
