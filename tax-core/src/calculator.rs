//! Entry point tying the rule table to the calculators.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{Regime, SalaryInput, TaxCalculator};
//!
//! let calculator = TaxCalculator::default();
//! let input = SalaryInput {
//!     basic_salary: dec!(1000000),
//!     rsu_shares_per_quarter: dec!(100),
//!     rsu_price_per_share: dec!(1000),
//!     ..Default::default()
//! };
//!
//! let summary = calculator.annual_summary(&input);
//! assert_eq!(summary.gross_salary, dec!(1312000));
//! assert_eq!(summary.recommended_regime, Regime::New);
//!
//! let months = calculator.monthly_breakdown(&input);
//! assert_eq!(months.len(), 12);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::calculations::{AnnualSummaryBuilder, MonthlyBreakdownBuilder, rsu_details};
use crate::models::{AnnualSummary, MonthlyRecord, SalaryInput, TaxRules};

/// Annual summary and monthly projection for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxReport {
    pub input: SalaryInput,
    pub summary: AnnualSummary,
    pub months: [MonthlyRecord; 12],
}

/// Computes tax for salary inputs under one fiscal year's rules.
///
/// Inputs are normalized (negative amounts clamped, withholding capped at
/// 100%) before any calculation runs. Nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct TaxCalculator {
    rules: TaxRules,
}

impl TaxCalculator {
    pub fn new(rules: TaxRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &TaxRules {
        &self.rules
    }

    pub fn annual_summary(
        &self,
        input: &SalaryInput,
    ) -> AnnualSummary {
        let input = input.normalized();
        AnnualSummaryBuilder::new(&self.rules).build(&input)
    }

    pub fn monthly_breakdown(
        &self,
        input: &SalaryInput,
    ) -> [MonthlyRecord; 12] {
        let input = input.normalized();
        MonthlyBreakdownBuilder::new(&self.rules).build(&input)
    }

    /// Summary and monthly projection from a single pass over the input.
    pub fn report(
        &self,
        input: &SalaryInput,
    ) -> TaxReport {
        let input = input.normalized();
        debug!(fiscal_year = %self.rules.fiscal_year, "calculating tax report");

        let summary = AnnualSummaryBuilder::new(&self.rules).build(&input);
        let rsu = rsu_details(&input);
        let months = MonthlyBreakdownBuilder::new(&self.rules).build_with(
            &input,
            &rsu,
            summary.old_regime.total_tax,
            summary.new_regime.total_tax,
        );

        TaxReport { input, summary, months }
    }
}
