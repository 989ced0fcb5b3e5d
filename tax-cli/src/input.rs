//! Reading salary inputs and rule tables for a command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tax_core::db::{DbConfig, RepositoryRegistry};
use tax_core::{FiscalYear, SalaryInput, TaxRules, TaxRulesRepository};
use tax_data::{SalaryRecord, salary_csv};
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

/// Where the rule table for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource<'a> {
    /// The FY 2025-26 table compiled into the engine.
    BuiltIn,
    /// A TOML rule document.
    File(&'a Path),
    /// A stored fiscal year in a rules database.
    Database {
        connection: &'a str,
        fiscal_year: FiscalYear,
    },
}

/// Every backend this binary links against.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Resolves the rule table for `source`.
pub async fn load_rules(source: &RulesSource<'_>) -> Result<TaxRules> {
    match source {
        RulesSource::BuiltIn => Ok(TaxRules::fy_2025_26()),
        RulesSource::File(path) => {
            let document = fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules: {}", path.display()))?;
            TaxRules::from_toml_str(&document)
                .with_context(|| format!("Invalid rules document: {}", path.display()))
        }
        RulesSource::Database {
            connection,
            fiscal_year,
        } => {
            let config = DbConfig {
                backend: "sqlite".to_string(),
                connection_string: connection.to_string(),
            };
            debug!(backend = %config.backend, "opening rules database");
            let repo = build_registry()
                .create(&config)
                .await
                .with_context(|| format!("Failed to open rules database: {connection}"))?;

            let rules = repo
                .load_rules(*fiscal_year)
                .await
                .with_context(|| format!("No usable rules for {fiscal_year} in {connection}"))?;
            info!(%fiscal_year, "rules loaded from database");
            Ok(rules)
        }
    }
}

/// Reads salary inputs from a `.toml` document (one input) or a `.csv`
/// file (one input per row).
///
/// Missing RSU rates fall back to the values in `rules`.
pub fn load_salary_inputs(
    path: &Path,
    rules: &TaxRules,
) -> Result<Vec<SalaryRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => {
            let document = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input: {}", path.display()))?;
            let input = parse_salary_toml(&document, rules)
                .with_context(|| format!("Invalid salary input: {}", path.display()))?;
            Ok(vec![SalaryRecord { name: None, input }])
        }
        Some("csv") => salary_csv::load_from_file(path, rules)
            .with_context(|| format!("Invalid salary CSV: {}", path.display())),
        _ => bail!(
            "unsupported input file '{}': expected .toml or .csv",
            path.display()
        ),
    }
}

/// Parses a TOML salary document. Keys left out take the [`SalaryInput`]
/// defaults, with the RSU rates taken from `rules` instead of the built-in
/// table.
pub fn parse_salary_toml(
    document: &str,
    rules: &TaxRules,
) -> Result<SalaryInput> {
    let table: toml::Table = toml::from_str(document)?;
    let mut input: SalaryInput = toml::Value::Table(table.clone()).try_into()?;

    if !table.contains_key("rsu_exchange_rate") {
        input.rsu_exchange_rate = rules.rsu.exchange_rate;
    }
    if !table.contains_key("rsu_withholding_rate") {
        input.rsu_withholding_rate = rules.rsu.withholding_rate;
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{FiscalMonth, RsuCurrency};

    use super::*;

    #[test]
    fn parse_salary_toml_fills_defaults() {
        let input = parse_salary_toml(
            "basic_salary = 1200000\nhra = 480000\nis_metro_city = true\n",
            &TaxRules::fy_2025_26(),
        )
        .unwrap();

        assert_eq!(input.basic_salary, dec!(1200000));
        assert_eq!(input.hra, dec!(480000));
        assert!(input.is_metro_city);
        assert_eq!(input.section_80c, dec!(0));
        assert_eq!(input.rsu_exchange_rate, dec!(83.00));
    }

    #[test]
    fn parse_salary_toml_reads_rsu_block() {
        let document = r#"
basic_salary = 2000000
rsu_shares_per_quarter = 10
rsu_price_per_share = 150
rsu_currency = "USD"
rsu_exchange_rate = 84.5
rsu_quarterly_months = ["June", "September"]
"#;
        let input = parse_salary_toml(document, &TaxRules::fy_2025_26()).unwrap();

        assert_eq!(input.rsu_currency, RsuCurrency::Usd);
        assert_eq!(input.rsu_exchange_rate, dec!(84.5));
        assert_eq!(input.rsu_withholding_rate, dec!(22));
        assert_eq!(
            input.rsu_quarterly_months,
            BTreeSet::from([FiscalMonth::June, FiscalMonth::September])
        );
    }

    #[test]
    fn parse_salary_toml_takes_rsu_rates_from_rules() {
        let mut rules = TaxRules::fy_2025_26();
        rules.rsu.exchange_rate = dec!(86);
        rules.rsu.withholding_rate = dec!(25);

        let input = parse_salary_toml("basic_salary = 900000\n", &rules).unwrap();

        assert_eq!(input.rsu_exchange_rate, dec!(86));
        assert_eq!(input.rsu_withholding_rate, dec!(25));
    }

    #[test]
    fn parse_salary_toml_rejects_unknown_month() {
        let result = parse_salary_toml(
            "basic_salary = 900000\nrsu_quarterly_months = [\"Smarch\"]\n",
            &TaxRules::fy_2025_26(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn load_salary_inputs_rejects_other_extensions() {
        let result = load_salary_inputs(Path::new("salary.json"), &TaxRules::fy_2025_26());

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn built_in_rules_source() {
        let rules = load_rules(&RulesSource::BuiltIn).await.unwrap();

        assert_eq!(rules, TaxRules::fy_2025_26());
    }

    #[tokio::test]
    async fn database_rules_source_uses_seeded_year() {
        let rules = load_rules(&RulesSource::Database {
            connection: "sqlite::memory:",
            fiscal_year: FiscalYear(2025),
        })
        .await
        .unwrap();

        assert_eq!(rules, TaxRules::fy_2025_26());
    }

    #[tokio::test]
    async fn database_rules_source_reports_missing_year() {
        let result = load_rules(&RulesSource::Database {
            connection: "sqlite::memory:",
            fiscal_year: FiscalYear(2030),
        })
        .await;

        assert!(result.is_err());
    }
}
