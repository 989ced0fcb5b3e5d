use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::FiscalMonth;

/// Cash-flow projection for one fiscal month.
///
/// Per-month figures are the month's share; `cumulative_*` figures run from
/// April through this month. All amounts are rounded to whole rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month: FiscalMonth,
    pub month_number: u32,
    pub period_start: Option<NaiveDate>,

    pub basic: Decimal,
    pub hra: Decimal,
    pub allowances: Decimal,
    /// Includes this month's net RSU, if any.
    pub gross_salary: Decimal,

    pub has_rsu_payout: bool,
    pub gross_rsu: Decimal,
    pub us_tax_withheld: Decimal,
    pub net_rsu: Decimal,

    pub provident_fund: Decimal,
    pub income_tax_old: Decimal,
    pub income_tax_new: Decimal,

    pub cumulative_basic: Decimal,
    pub cumulative_hra: Decimal,
    pub cumulative_allowances: Decimal,
    pub cumulative_gross_salary: Decimal,
    pub cumulative_provident_fund: Decimal,
    pub cumulative_tax_old: Decimal,
    pub cumulative_tax_new: Decimal,
    pub cumulative_gross_rsu: Decimal,
    pub cumulative_us_tax_withheld: Decimal,
    pub cumulative_net_rsu: Decimal,

    pub net_salary_old: Decimal,
    pub net_salary_new: Decimal,
}
