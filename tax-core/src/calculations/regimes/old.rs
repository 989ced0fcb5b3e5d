use rust_decimal::Decimal;

use crate::calculations::common::{max, min};
use crate::calculations::hra::hra_exemption;
use crate::calculations::regimes::{RegimeCalculator, SlabOutcome};
use crate::calculations::slabs::tax_by_slabs;
use crate::models::{Regime, SalaryInput, TaxRules};

/// Old regime: standard deduction plus HRA, 80C, 80D, 24(b) and other
/// deductions. No rebate.
#[derive(Debug, Clone, Copy)]
pub struct OldRegime<'a> {
    rules: &'a TaxRules,
}

impl<'a> OldRegime<'a> {
    pub fn new(rules: &'a TaxRules) -> Self {
        Self { rules }
    }
}

impl RegimeCalculator for OldRegime<'_> {
    fn regime(&self) -> Regime {
        Regime::Old
    }

    fn rules(&self) -> &TaxRules {
        self.rules
    }

    fn taxable_income_from_gross(
        &self,
        input: &SalaryInput,
        gross_salary: Decimal,
    ) -> Decimal {
        let after_standard =
            max(Decimal::ZERO, gross_salary - self.rules.old_regime.standard_deduction);

        max(Decimal::ZERO, after_standard - old_regime_deductions(input, self.rules))
    }

    fn slab_tax(
        &self,
        taxable_income: Decimal,
    ) -> SlabOutcome {
        SlabOutcome {
            tax: tax_by_slabs(taxable_income, &self.rules.old_regime.slabs),
            rebate: Decimal::ZERO,
        }
    }
}

/// Old-regime deductions other than the standard deduction: HRA exemption
/// (only when both HRA and rent are present), capped 80C, 80D, capped 24(b)
/// and other deductions. Unrounded.
///
/// The annual summary reports this same figure, so the two cannot disagree.
pub fn old_regime_deductions(
    input: &SalaryInput,
    rules: &TaxRules,
) -> Decimal {
    let hra = if input.hra > Decimal::ZERO && input.rent_paid > Decimal::ZERO {
        hra_exemption(
            input.hra,
            input.basic_salary,
            input.rent_paid,
            input.is_metro_city,
            &rules.hra,
        )
    } else {
        Decimal::ZERO
    };

    let limits = &rules.deduction_limits;

    hra + min(input.section_80c, limits.section_80c)
        + input.section_80d
        + min(input.section_24b, limits.section_24b)
        + input.other_deductions
}
