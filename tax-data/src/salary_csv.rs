//! CSV loader for batch salary inputs.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter. Only
//! `basic_salary` is required; every other column may be omitted entirely
//! or left empty, in which case the [`SalaryInput`] default applies (zero
//! for amounts, the rule table's RSU exchange and withholding rates).
//!
//! | Column                  | Type    | Notes                                      |
//! |-------------------------|---------|--------------------------------------------|
//! | `name`                  | string  | Row label used in batch reports            |
//! | `basic_salary`          | decimal | required                                   |
//! | `hra`                   | decimal |                                            |
//! | `special_allowance`     | decimal |                                            |
//! | `lta`                   | decimal |                                            |
//! | `medical_allowance`     | decimal |                                            |
//! | `other_allowances`      | decimal |                                            |
//! | `perquisites`           | decimal |                                            |
//! | `rent_paid`             | decimal | annual                                     |
//! | `is_metro_city`         | bool    | `true` / `false`                           |
//! | `section_80c`           | decimal |                                            |
//! | `section_80d`           | decimal |                                            |
//! | `section_24b`           | decimal |                                            |
//! | `other_deductions`      | decimal |                                            |
//! | `rsu_shares_per_quarter`| decimal |                                            |
//! | `rsu_price_per_share`   | decimal |                                            |
//! | `rsu_currency`          | string  | `INR` or `USD`                             |
//! | `rsu_exchange_rate`     | decimal | INR per USD                                |
//! | `rsu_withholding_rate`  | decimal | percent                                    |
//! | `rsu_quarterly_months`  | string  | month names separated by `;`, e.g. `June;September` |
//!
//! ### Example
//!
//! ```csv
//! name,basic_salary,hra,rent_paid,is_metro_city,section_80c
//! asha,1200000,480000,360000,true,150000
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{FiscalMonth, RsuCurrency, SalaryInput, TaxRules};
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: Option<String>,
    basic_salary: Decimal,
    #[serde(default)]
    hra: Option<Decimal>,
    #[serde(default)]
    special_allowance: Option<Decimal>,
    #[serde(default)]
    lta: Option<Decimal>,
    #[serde(default)]
    medical_allowance: Option<Decimal>,
    #[serde(default)]
    other_allowances: Option<Decimal>,
    #[serde(default)]
    perquisites: Option<Decimal>,
    #[serde(default)]
    rent_paid: Option<Decimal>,
    #[serde(default)]
    is_metro_city: Option<bool>,
    #[serde(default)]
    section_80c: Option<Decimal>,
    #[serde(default)]
    section_80d: Option<Decimal>,
    #[serde(default)]
    section_24b: Option<Decimal>,
    #[serde(default)]
    other_deductions: Option<Decimal>,
    #[serde(default)]
    rsu_shares_per_quarter: Option<Decimal>,
    #[serde(default)]
    rsu_price_per_share: Option<Decimal>,
    #[serde(default)]
    rsu_currency: Option<String>,
    #[serde(default)]
    rsu_exchange_rate: Option<Decimal>,
    #[serde(default)]
    rsu_withholding_rate: Option<Decimal>,
    #[serde(default)]
    rsu_quarterly_months: Option<String>,
}

/// Errors that can occur while loading salary rows.
#[derive(Debug, Error)]
pub enum SalaryCsvError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unrecognised RSU currency '{value}' on row {row}")]
    InvalidCurrency { value: String, row: usize },

    #[error("unrecognised payout month '{value}' on row {row}")]
    InvalidMonth { value: String, row: usize },

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One parsed row: an optional label and the salary input it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRecord {
    pub name: Option<String>,
    pub input: SalaryInput,
}

fn parse_months(
    cell: &str,
    row: usize,
) -> Result<BTreeSet<FiscalMonth>, SalaryCsvError> {
    cell.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            FiscalMonth::parse(part).ok_or_else(|| SalaryCsvError::InvalidMonth {
                value: part.to_string(),
                row,
            })
        })
        .collect()
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
    rules: &TaxRules,
) -> Result<SalaryRecord, SalaryCsvError> {
    let mut input = SalaryInput::with_rule_defaults(rules);
    input.basic_salary = row.basic_salary;

    for (target, value) in [
        (&mut input.hra, row.hra),
        (&mut input.special_allowance, row.special_allowance),
        (&mut input.lta, row.lta),
        (&mut input.medical_allowance, row.medical_allowance),
        (&mut input.other_allowances, row.other_allowances),
        (&mut input.perquisites, row.perquisites),
        (&mut input.rent_paid, row.rent_paid),
        (&mut input.section_80c, row.section_80c),
        (&mut input.section_80d, row.section_80d),
        (&mut input.section_24b, row.section_24b),
        (&mut input.other_deductions, row.other_deductions),
        (&mut input.rsu_shares_per_quarter, row.rsu_shares_per_quarter),
        (&mut input.rsu_price_per_share, row.rsu_price_per_share),
        (&mut input.rsu_exchange_rate, row.rsu_exchange_rate),
        (&mut input.rsu_withholding_rate, row.rsu_withholding_rate),
    ] {
        if let Some(value) = value {
            *target = value;
        }
    }

    input.is_metro_city = row.is_metro_city.unwrap_or(false);

    if let Some(currency) = row.rsu_currency.filter(|c| !c.trim().is_empty()) {
        input.rsu_currency =
            RsuCurrency::parse(&currency).ok_or(SalaryCsvError::InvalidCurrency {
                value: currency,
                row: row_number,
            })?;
    }

    if let Some(months) = row.rsu_quarterly_months {
        input.rsu_quarterly_months = parse_months(&months, row_number)?;
    }

    Ok(SalaryRecord {
        name: row.name.filter(|n| !n.is_empty()),
        input,
    })
}

/// Parse CSV text into salary records, in file order.
///
/// `rules` supplies the RSU exchange and withholding defaults for rows that
/// leave those columns empty.
pub fn load_from_str(
    input: &str,
    rules: &TaxRules,
) -> Result<Vec<SalaryRecord>, SalaryCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1, rules)
        })
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    rules: &TaxRules,
) -> Result<Vec<SalaryRecord>, SalaryCsvError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SalaryCsvError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents, rules)
}
