//! Indian salary tax engine.
//!
//! Computes old- and new-regime income tax for a salaried individual,
//! including quarterly RSU income with DTAA credit for tax withheld abroad,
//! and projects the result across the twelve months of the fiscal year.
//!
//! The engine is pure: every calculator takes a [`SalaryInput`] and a
//! [`TaxRules`] table and returns plain data. Storage of rule tables lives
//! behind [`TaxRulesRepository`].

pub mod calculations;
pub mod calculator;
pub mod db;
pub mod models;
pub mod validation;

pub use calculator::{TaxCalculator, TaxReport};
pub use db::repository::{RepositoryError, TaxRulesRepository};
pub use models::*;
pub use validation::{ValidationIssue, validate_salary_input};
