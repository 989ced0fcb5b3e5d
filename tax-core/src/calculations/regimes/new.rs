use rust_decimal::Decimal;

use crate::calculations::common::max;
use crate::calculations::regimes::{RegimeCalculator, SlabOutcome};
use crate::calculations::slabs::tax_by_slabs;
use crate::models::{Regime, SalaryInput, TaxRules};

/// New regime: standard deduction only, with the Section 87A rebate below
/// the rebate limit.
#[derive(Debug, Clone, Copy)]
pub struct NewRegime<'a> {
    rules: &'a TaxRules,
}

impl<'a> NewRegime<'a> {
    pub fn new(rules: &'a TaxRules) -> Self {
        Self { rules }
    }
}

impl RegimeCalculator for NewRegime<'_> {
    fn regime(&self) -> Regime {
        Regime::New
    }

    fn rules(&self) -> &TaxRules {
        self.rules
    }

    fn taxable_income_from_gross(
        &self,
        _input: &SalaryInput,
        gross_salary: Decimal,
    ) -> Decimal {
        max(Decimal::ZERO, gross_salary - self.rules.new_regime.standard_deduction)
    }

    /// The rebate is reported as the flat amount even when the slab tax is
    /// smaller.
    fn slab_tax(
        &self,
        taxable_income: Decimal,
    ) -> SlabOutcome {
        let rules = &self.rules.new_regime;
        let tax = tax_by_slabs(taxable_income, &rules.slabs);

        if taxable_income <= rules.rebate_limit {
            SlabOutcome {
                tax: max(Decimal::ZERO, tax - rules.rebate_amount),
                rebate: rules.rebate_amount,
            }
        } else {
            SlabOutcome { tax, rebate: Decimal::ZERO }
        }
    }
}
