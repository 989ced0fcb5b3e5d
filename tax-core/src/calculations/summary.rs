//! Annual summary and regime comparison.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::round_rupee;
use crate::calculations::regimes::{NewRegime, OldRegime, RegimeCalculator, old_regime_deductions};
use crate::calculations::rsu::rsu_details;
use crate::calculations::salary::gross_salary_with;
use crate::models::{AnnualSummary, Regime, RegimeSummary, RsuSummary, SalaryInput, TaxRules};

/// Builds the annual view of both regimes for one input.
///
/// The RSU grant is converted once and both regime calculators run once.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::AnnualSummaryBuilder;
/// use tax_core::{Regime, SalaryInput, TaxRules};
///
/// let rules = TaxRules::fy_2025_26();
/// let input = SalaryInput { basic_salary: dec!(600000), ..Default::default() };
///
/// let summary = AnnualSummaryBuilder::new(&rules).build(&input);
///
/// assert_eq!(summary.old_regime.total_tax, dec!(23400));
/// assert_eq!(summary.new_regime.total_tax, dec!(0));
/// assert_eq!(summary.recommended_regime, Regime::New);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AnnualSummaryBuilder<'a> {
    rules: &'a TaxRules,
}

impl<'a> AnnualSummaryBuilder<'a> {
    pub fn new(rules: &'a TaxRules) -> Self {
        Self { rules }
    }

    pub fn build(
        &self,
        input: &SalaryInput,
    ) -> AnnualSummary {
        let rsu = rsu_details(input);
        let gross = gross_salary_with(input, &rsu);

        let old = OldRegime::new(self.rules).calculate_with_rsu(input, &rsu);
        let new = NewRegime::new(self.rules).calculate_with_rsu(input, &rsu);

        let old_deductions =
            self.rules.old_regime.standard_deduction + old_regime_deductions(input, self.rules);
        let new_deductions = self.rules.new_regime.standard_deduction;

        let dtaa_credit = if old.dtaa_credit.is_zero() { new.dtaa_credit } else { old.dtaa_credit };

        let savings = new.total_tax - old.total_tax;
        let recommended_regime =
            if new.total_tax < old.total_tax { Regime::New } else { Regime::Old };

        debug!(%gross, %savings, %recommended_regime, "built annual summary");

        AnnualSummary {
            fiscal_year: self.rules.fiscal_year,
            gross_salary: round_rupee(gross),
            gross_salary_without_rsu: round_rupee(gross - rsu.net_rsu),
            rsu: RsuSummary {
                gross_rsu: rsu.gross_rsu,
                us_tax_withheld: rsu.us_tax_withheld,
                net_rsu: rsu.net_rsu,
                dtaa_credit,
            },
            old_regime: RegimeSummary::from_result(&old, old_deductions, gross),
            new_regime: RegimeSummary::from_result(&new, new_deductions, gross),
            savings,
            recommended_regime,
        }
    }
}
