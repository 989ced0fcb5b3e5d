//! Loads the on-disk salary fixture, complementing the inline-string unit
//! tests in `salary_csv.rs`.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{FiscalMonth, RsuCurrency, TaxRules};
use tax_data::salary_csv;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("salaries.csv")
}

#[test]
fn test_load_fixture_file_succeeds() {
    let records = salary_csv::load_from_file(&fixture_path(), &TaxRules::fy_2025_26())
        .expect("fixture file should load without error");

    assert_eq!(records.len(), 3);
    let names: Vec<_> = records.iter().map(|r| r.name.as_deref()).collect();
    assert_eq!(names, vec![Some("fresher"), Some("metro"), Some("rsu")]);
}

#[test]
fn test_fixture_empty_cells_fall_back_to_defaults() {
    let records = salary_csv::load_from_file(&fixture_path(), &TaxRules::fy_2025_26()).unwrap();
    let input = &records[0].input;

    assert_eq!(input.basic_salary, dec!(600000));
    assert_eq!(input.hra, dec!(0));
    assert!(!input.is_metro_city);
    assert_eq!(input.rsu_currency, RsuCurrency::Inr);
    assert_eq!(input.rsu_exchange_rate, dec!(83.00));
    assert!(input.rsu_quarterly_months.is_empty());
}

#[test]
fn test_fixture_rsu_row() {
    let records = salary_csv::load_from_file(&fixture_path(), &TaxRules::fy_2025_26()).unwrap();
    let input = &records[2].input;

    assert_eq!(input.rsu_currency, RsuCurrency::Usd);
    assert_eq!(input.rsu_shares_per_quarter, dec!(10));
    assert_eq!(input.rsu_price_per_share, dec!(150));
    assert_eq!(input.rsu_quarterly_months.len(), 4);
    assert!(input.rsu_quarterly_months.contains(&FiscalMonth::March));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = salary_csv::load_from_file(
        &fixture_path().with_file_name("missing.csv"),
        &TaxRules::fy_2025_26(),
    );

    assert!(matches!(result, Err(salary_csv::SalaryCsvError::Io { .. })));
}
