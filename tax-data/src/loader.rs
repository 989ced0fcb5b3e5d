use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    FiscalYear, Regime, RepositoryError, SurchargeBand, TaxRulesError, TaxRulesRepository, TaxSlab,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading rule tables.
#[derive(Debug, Error)]
pub enum RulesLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid fiscal year '{value}' on row {row}")]
    InvalidFiscalYear { value: String, row: usize },

    #[error("Invalid table '{value}' on row {row} (expected old, new or surcharge)")]
    InvalidTable { value: String, row: usize },

    #[error("Fiscal year {0} not found in database (have you run the seeds?)")]
    FiscalYearNotFound(FiscalYear),

    #[error("Loaded tables are invalid: {0}")]
    InvalidRules(#[from] TaxRulesError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RulesLoaderError {
    fn from(err: csv::Error) -> Self {
        RulesLoaderError::CsvParse(err.to_string())
    }
}

/// Which rule table a CSV row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleTable {
    OldSlabs,
    NewSlabs,
    Surcharge,
}

impl RuleTable {
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("surcharge") {
            return Some(Self::Surcharge);
        }
        Regime::parse(s).map(|regime| match regime {
            Regime::Old => Self::OldSlabs,
            Regime::New => Self::NewSlabs,
        })
    }
}

/// A single row of a rule-table CSV file.
///
/// - `fiscal_year`: start year or label (`2025` or `2025-26`)
/// - `table`: `old` or `new` for regime slabs, `surcharge` for surcharge bands
/// - `min_income`: lower bound of the slab or band
/// - `max_income`: upper bound (empty for the open-ended top row)
/// - `rate`: percentage (30 means 30%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleRecord {
    pub fiscal_year: String,
    pub table: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

type Groups<'a> = BTreeMap<FiscalYear, BTreeMap<RuleTable, Vec<&'a RuleRecord>>>;

/// Loader for slab and surcharge tables from CSV files.
///
/// Works against any [`TaxRulesRepository`] backend. The fiscal-year
/// configuration (deduction caps, rebate, cess and so on) must already be
/// stored; the CSV only replaces the banded tables.
pub struct RulesLoader;

impl RulesLoader {
    /// Parse rule records from a CSV reader, in file order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RuleRecord>, RulesLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RuleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load rule records into the repository and return the number of rows
    /// written.
    ///
    /// Records are grouped by fiscal year and table, keeping file order
    /// within a group. For each fiscal year the new tables are merged with
    /// the stored ones and the result is validated before anything is
    /// written, so a bad file leaves the database untouched for that year.
    /// Each group then replaces its table wholesale, which makes loading
    /// idempotent.
    pub async fn load<R: TaxRulesRepository + ?Sized>(
        repo: &R,
        records: &[RuleRecord],
    ) -> Result<usize, RulesLoaderError> {
        let groups = Self::group(records)?;
        let mut written = 0;

        for (fiscal_year, tables) in &groups {
            Self::validate_merged(repo, *fiscal_year, tables).await?;

            for (table, rows) in tables {
                match table {
                    RuleTable::OldSlabs | RuleTable::NewSlabs => {
                        let regime = match table {
                            RuleTable::OldSlabs => Regime::Old,
                            _ => Regime::New,
                        };
                        repo.replace_tax_slabs(*fiscal_year, regime, &to_slabs(rows))
                            .await?;
                    }
                    RuleTable::Surcharge => {
                        repo.replace_surcharge_bands(*fiscal_year, &to_bands(rows))
                            .await?;
                    }
                }
                debug!(%fiscal_year, ?table, rows = rows.len(), "replaced rule table");
                written += rows.len();
            }
        }

        info!(fiscal_years = groups.len(), rows = written, "rule tables loaded");
        Ok(written)
    }

    fn group(records: &[RuleRecord]) -> Result<Groups<'_>, RulesLoaderError> {
        let mut groups = Groups::new();

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let fiscal_year = FiscalYear::parse(&record.fiscal_year).ok_or_else(|| {
                RulesLoaderError::InvalidFiscalYear {
                    value: record.fiscal_year.clone(),
                    row,
                }
            })?;
            let table =
                RuleTable::parse(&record.table).ok_or_else(|| RulesLoaderError::InvalidTable {
                    value: record.table.clone(),
                    row,
                })?;

            groups
                .entry(fiscal_year)
                .or_default()
                .entry(table)
                .or_default()
                .push(record);
        }

        Ok(groups)
    }

    async fn validate_merged<R: TaxRulesRepository + ?Sized>(
        repo: &R,
        fiscal_year: FiscalYear,
        tables: &BTreeMap<RuleTable, Vec<&RuleRecord>>,
    ) -> Result<(), RulesLoaderError> {
        let config = repo
            .get_fiscal_year_config(fiscal_year)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => RulesLoaderError::FiscalYearNotFound(fiscal_year),
                other => RulesLoaderError::Repository(other),
            })?;

        let old_slabs = match tables.get(&RuleTable::OldSlabs) {
            Some(rows) => to_slabs(rows),
            None => repo.get_tax_slabs(fiscal_year, Regime::Old).await?,
        };
        let new_slabs = match tables.get(&RuleTable::NewSlabs) {
            Some(rows) => to_slabs(rows),
            None => repo.get_tax_slabs(fiscal_year, Regime::New).await?,
        };
        let bands = match tables.get(&RuleTable::Surcharge) {
            Some(rows) => to_bands(rows),
            None => repo.get_surcharge_bands(fiscal_year).await?,
        };

        config.into_rules(old_slabs, new_slabs, bands).validate()?;
        Ok(())
    }
}

fn to_slabs(rows: &[&RuleRecord]) -> Vec<TaxSlab> {
    rows.iter()
        .map(|r| TaxSlab::new(r.min_income, r.max_income, r.rate))
        .collect()
}

fn to_bands(rows: &[&RuleRecord]) -> Vec<SurchargeBand> {
    rows.iter()
        .map(|r| SurchargeBand::new(r.min_income, r.max_income, r.rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"fiscal_year,table,min_income,max_income,rate
2025-26,old,0,250000,0
2025-26,old,250001,500000,5
2025-26,old,500001,1000000,20
2025-26,old,1000001,,30
2025,surcharge,5000001,10000000,10
"#;

    #[test]
    fn test_parse_csv() {
        let records = RulesLoader::parse(TEST_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 5);

        assert_eq!(records[0].fiscal_year, "2025-26");
        assert_eq!(records[0].table, "old");
        assert_eq!(records[0].min_income, dec!(0));
        assert_eq!(records[0].max_income, Some(dec!(250000)));
        assert_eq!(records[0].rate, dec!(0));

        assert_eq!(records[3].max_income, None);
        assert_eq!(records[3].rate, dec!(30));

        assert_eq!(records[4].table, "surcharge");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let csv = "fiscal_year, table, min_income, max_income, rate\n2025 , new , 0 , 400000 , 0\n";
        let records = RulesLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(records[0].table, "new");
        assert_eq!(records[0].max_income, Some(dec!(400000)));
    }

    #[test]
    fn test_parse_rejects_bad_decimal() {
        let csv = "fiscal_year,table,min_income,max_income,rate\n2025,old,zero,,5\n";
        let result = RulesLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(RulesLoaderError::CsvParse(_))));
    }

    #[test]
    fn test_rule_table_parse() {
        assert_eq!(RuleTable::parse("old"), Some(RuleTable::OldSlabs));
        assert_eq!(RuleTable::parse("NEW"), Some(RuleTable::NewSlabs));
        assert_eq!(RuleTable::parse(" Surcharge "), Some(RuleTable::Surcharge));
        assert_eq!(RuleTable::parse("cess"), None);
    }

    #[test]
    fn test_group_by_year_and_table_keeps_file_order() {
        let records = RulesLoader::parse(TEST_CSV.as_bytes()).unwrap();
        let groups = RulesLoader::group(&records).unwrap();

        assert_eq!(groups.len(), 1);
        let tables = &groups[&FiscalYear(2025)];
        assert_eq!(tables.len(), 2);

        let old = &tables[&RuleTable::OldSlabs];
        assert_eq!(old.len(), 4);
        assert_eq!(old[1].min_income, dec!(250001));
        assert_eq!(old[3].max_income, None);
    }

    #[test]
    fn test_group_reports_row_of_invalid_table() {
        let csv = "fiscal_year,table,min_income,max_income,rate\n2025,old,0,,0\n2025,cess,0,,4\n";
        let records = RulesLoader::parse(csv.as_bytes()).unwrap();

        match RulesLoader::group(&records) {
            Err(RulesLoaderError::InvalidTable { value, row }) => {
                assert_eq!(value, "cess");
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn test_group_reports_invalid_fiscal_year() {
        let csv = "fiscal_year,table,min_income,max_income,rate\n2025-27,old,0,,0\n";
        let records = RulesLoader::parse(csv.as_bytes()).unwrap();

        assert!(matches!(
            RulesLoader::group(&records),
            Err(RulesLoaderError::InvalidFiscalYear { row: 1, .. })
        ));
    }
}
