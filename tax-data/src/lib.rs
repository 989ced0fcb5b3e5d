//! Bulk loading for the salary tax engine: rule-table CSVs into any
//! [`TaxRulesRepository`](tax_core::TaxRulesRepository) backend, and salary
//! input CSVs for batch runs.

pub mod loader;
pub mod salary_csv;

pub use loader::{RuleRecord, RuleTable, RulesLoader, RulesLoaderError};
pub use salary_csv::{SalaryCsvError, SalaryRecord};
