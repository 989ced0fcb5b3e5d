use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{round_percent, round_rupee};
use crate::models::{FiscalYear, Regime, RegimeResult};

/// RSU figures as reported in the annual summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsuSummary {
    pub gross_rsu: Decimal,
    pub us_tax_withheld: Decimal,
    pub net_rsu: Decimal,

    /// Applied DTAA credit: the old regime's when non-zero, else the new
    /// regime's.
    pub dtaa_credit: Decimal,
}

/// One regime's column in the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeSummary {
    pub regime: Regime,

    /// Everything subtracted from gross salary, standard deduction included.
    pub deductions: Decimal,

    pub taxable_income: Decimal,
    pub tax: Decimal,
    pub rebate: Decimal,
    pub surcharge: Decimal,
    pub cess: Decimal,
    pub dtaa_credit: Decimal,
    pub total_tax: Decimal,

    /// Gross salary minus total tax.
    pub net_salary: Decimal,
}

impl RegimeSummary {
    pub fn from_result(
        result: &RegimeResult,
        deductions: Decimal,
        gross_salary: Decimal,
    ) -> Self {
        Self {
            regime: result.regime,
            deductions: round_rupee(deductions),
            taxable_income: result.taxable_income,
            tax: result.tax,
            rebate: result.rebate,
            surcharge: result.surcharge,
            cess: result.cess,
            dtaa_credit: result.dtaa_credit,
            total_tax: result.total_tax,
            net_salary: round_rupee(gross_salary - result.total_tax),
        }
    }
}

/// Annual view of both regimes for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub fiscal_year: FiscalYear,
    pub gross_salary: Decimal,
    pub gross_salary_without_rsu: Decimal,
    pub rsu: RsuSummary,
    pub old_regime: RegimeSummary,
    pub new_regime: RegimeSummary,

    /// New-regime total tax minus old-regime total tax. Positive when the
    /// old regime is cheaper.
    pub savings: Decimal,

    pub recommended_regime: Regime,
}

impl AnnualSummary {
    pub fn regime(
        &self,
        regime: Regime,
    ) -> &RegimeSummary {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }

    pub fn recommended(&self) -> &RegimeSummary {
        self.regime(self.recommended_regime)
    }

    /// Total tax of `regime` as a whole-number percentage of gross salary.
    /// Zero when there is no gross salary.
    pub fn tax_share_percent(
        &self,
        regime: Regime,
    ) -> Decimal {
        if self.gross_salary <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_percent(self.regime(regime).total_tax / self.gross_salary * Decimal::ONE_HUNDRED)
    }
}
