mod annual_summary;
mod fiscal_calendar;
mod fiscal_year_config;
mod monthly_record;
mod regime;
mod regime_result;
mod rsu_detail;
mod salary_input;
mod surcharge_band;
mod tax_rules;
mod tax_slab;

pub use annual_summary::{AnnualSummary, RegimeSummary, RsuSummary};
pub use fiscal_calendar::{FiscalMonth, FiscalYear};
pub use fiscal_year_config::FiscalYearConfig;
pub use monthly_record::MonthlyRecord;
pub use regime::Regime;
pub use regime_result::RegimeResult;
pub use rsu_detail::RsuDetail;
pub use salary_input::{RsuCurrency, SalaryInput};
pub use surcharge_band::SurchargeBand;
pub use tax_rules::{
    DeductionLimits, HraRules, NewRegimeRules, OldRegimeRules, RsuDefaults, TaxRules,
    TaxRulesError,
};
pub use tax_slab::TaxSlab;
