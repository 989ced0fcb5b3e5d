use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tax_core::{
    FiscalYear, FiscalYearConfig, Regime, RepositoryError, SurchargeBand, TaxRulesRepository,
    TaxSlab,
};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

pub struct SqliteRulesRepository {
    pool: SqlitePool,
}

impl SqliteRulesRepository {
    /// Opens `database_url`, creating the database file if it does not
    /// exist. An in-memory database is held on a single connection so every
    /// query sees the same data.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;

            info!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_fiscal_year_config(
    row: &sqlx::sqlite::SqliteRow
) -> Result<FiscalYearConfig, RepositoryError> {
    Ok(FiscalYearConfig {
        fiscal_year: FiscalYear(row.try_get("fiscal_year").map_err(db_error)?),
        old_standard_deduction: get_decimal(row, "old_standard_deduction")?,
        new_standard_deduction: get_decimal(row, "new_standard_deduction")?,
        rebate_limit: get_decimal(row, "rebate_limit")?,
        rebate_amount: get_decimal(row, "rebate_amount")?,
        cess_rate: get_decimal(row, "cess_rate")?,
        section_80c_limit: get_decimal(row, "section_80c_limit")?,
        section_80d_self_family_limit: get_decimal(row, "section_80d_self_family_limit")?,
        section_80d_parents_limit: get_decimal(row, "section_80d_parents_limit")?,
        section_24b_limit: get_decimal(row, "section_24b_limit")?,
        hra_metro_percentage: get_decimal(row, "hra_metro_percentage")?,
        hra_non_metro_percentage: get_decimal(row, "hra_non_metro_percentage")?,
        hra_rent_basic_percentage: get_decimal(row, "hra_rent_basic_percentage")?,
        provident_fund_rate: get_decimal(row, "provident_fund_rate")?,
        rsu_exchange_rate: get_decimal(row, "rsu_exchange_rate")?,
        rsu_withholding_rate: get_decimal(row, "rsu_withholding_rate")?,
    })
}

#[async_trait]
impl TaxRulesRepository for SqliteRulesRepository {
    async fn get_fiscal_year_config(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<FiscalYearConfig, RepositoryError> {
        let row = sqlx::query("SELECT * FROM fiscal_year_config WHERE fiscal_year = ?")
            .bind(fiscal_year.start_year())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_fiscal_year_config(&row)
    }

    async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, RepositoryError> {
        let rows =
            sqlx::query("SELECT fiscal_year FROM fiscal_year_config ORDER BY fiscal_year DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;

        rows.iter()
            .map(|row| row.try_get("fiscal_year").map(FiscalYear).map_err(db_error))
            .collect()
    }

    async fn upsert_fiscal_year_config(
        &self,
        config: &FiscalYearConfig,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO fiscal_year_config (
                fiscal_year, old_standard_deduction, new_standard_deduction,
                rebate_limit, rebate_amount, cess_rate,
                section_80c_limit, section_80d_self_family_limit, section_80d_parents_limit,
                section_24b_limit, hra_metro_percentage, hra_non_metro_percentage,
                hra_rent_basic_percentage, provident_fund_rate, rsu_exchange_rate,
                rsu_withholding_rate
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (fiscal_year) DO UPDATE SET
                old_standard_deduction = excluded.old_standard_deduction,
                new_standard_deduction = excluded.new_standard_deduction,
                rebate_limit = excluded.rebate_limit,
                rebate_amount = excluded.rebate_amount,
                cess_rate = excluded.cess_rate,
                section_80c_limit = excluded.section_80c_limit,
                section_80d_self_family_limit = excluded.section_80d_self_family_limit,
                section_80d_parents_limit = excluded.section_80d_parents_limit,
                section_24b_limit = excluded.section_24b_limit,
                hra_metro_percentage = excluded.hra_metro_percentage,
                hra_non_metro_percentage = excluded.hra_non_metro_percentage,
                hra_rent_basic_percentage = excluded.hra_rent_basic_percentage,
                provident_fund_rate = excluded.provident_fund_rate,
                rsu_exchange_rate = excluded.rsu_exchange_rate,
                rsu_withholding_rate = excluded.rsu_withholding_rate",
        )
        .bind(config.fiscal_year.start_year())
        .bind(decimal_to_text(config.old_standard_deduction))
        .bind(decimal_to_text(config.new_standard_deduction))
        .bind(decimal_to_text(config.rebate_limit))
        .bind(decimal_to_text(config.rebate_amount))
        .bind(decimal_to_text(config.cess_rate))
        .bind(decimal_to_text(config.section_80c_limit))
        .bind(decimal_to_text(config.section_80d_self_family_limit))
        .bind(decimal_to_text(config.section_80d_parents_limit))
        .bind(decimal_to_text(config.section_24b_limit))
        .bind(decimal_to_text(config.hra_metro_percentage))
        .bind(decimal_to_text(config.hra_non_metro_percentage))
        .bind(decimal_to_text(config.hra_rent_basic_percentage))
        .bind(decimal_to_text(config.provident_fund_rate))
        .bind(decimal_to_text(config.rsu_exchange_rate))
        .bind(decimal_to_text(config.rsu_withholding_rate))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn get_tax_slabs(
        &self,
        fiscal_year: FiscalYear,
        regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT min_income, max_income, rate FROM tax_slab
             WHERE fiscal_year = ? AND regime = ?
             ORDER BY position",
        )
        .bind(fiscal_year.start_year())
        .bind(regime.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(TaxSlab {
                    min: get_decimal(row, "min_income")?,
                    max: get_optional_decimal(row, "max_income")?,
                    rate: get_decimal(row, "rate")?,
                })
            })
            .collect()
    }

    async fn replace_tax_slabs(
        &self,
        fiscal_year: FiscalYear,
        regime: Regime,
        slabs: &[TaxSlab],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM tax_slab WHERE fiscal_year = ? AND regime = ?")
            .bind(fiscal_year.start_year())
            .bind(regime.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for (position, slab) in slabs.iter().enumerate() {
            sqlx::query(
                "INSERT INTO tax_slab (fiscal_year, regime, position, min_income, max_income, rate)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(fiscal_year.start_year())
            .bind(regime.as_str())
            .bind(position as i64)
            .bind(decimal_to_text(slab.min))
            .bind(slab.max.map(decimal_to_text))
            .bind(decimal_to_text(slab.rate))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        debug!(%fiscal_year, %regime, count = slabs.len(), "replaced tax slabs");
        Ok(())
    }

    async fn get_surcharge_bands(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<Vec<SurchargeBand>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT min_income, max_income, rate FROM surcharge_band
             WHERE fiscal_year = ?
             ORDER BY position",
        )
        .bind(fiscal_year.start_year())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(SurchargeBand {
                    min: get_decimal(row, "min_income")?,
                    max: get_optional_decimal(row, "max_income")?,
                    rate: get_decimal(row, "rate")?,
                })
            })
            .collect()
    }

    async fn replace_surcharge_bands(
        &self,
        fiscal_year: FiscalYear,
        bands: &[SurchargeBand],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM surcharge_band WHERE fiscal_year = ?")
            .bind(fiscal_year.start_year())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for (position, band) in bands.iter().enumerate() {
            sqlx::query(
                "INSERT INTO surcharge_band (fiscal_year, position, min_income, max_income, rate)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(fiscal_year.start_year())
            .bind(position as i64)
            .bind(decimal_to_text(band.min))
            .bind(band.max.map(decimal_to_text))
            .bind(decimal_to_text(band.rate))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        debug!(%fiscal_year, count = bands.len(), "replaced surcharge bands");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::TaxRules;

    use super::*;

    async fn setup_test_db() -> SqliteRulesRepository {
        let repo = SqliteRulesRepository::new("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations().await.expect("Failed to run migrations");
        repo
    }

    fn test_config(year: i32) -> FiscalYearConfig {
        let mut config = FiscalYearConfig::from_rules(&TaxRules::fy_2025_26());
        config.fiscal_year = FiscalYear(year);
        config
    }

    // ── fiscal year config ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_upsert_and_get_fiscal_year_config() {
        let repo = setup_test_db().await;
        let config = test_config(2030);

        repo.upsert_fiscal_year_config(&config).await.expect("Should insert config");
        let fetched = repo.get_fiscal_year_config(FiscalYear(2030)).await.expect("Should fetch");

        assert_eq!(fetched, config);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_config() {
        let repo = setup_test_db().await;
        let mut config = test_config(2030);
        repo.upsert_fiscal_year_config(&config).await.expect("Should insert config");

        config.rebate_limit = dec!(1500000);
        config.rsu_exchange_rate = dec!(86.25);
        repo.upsert_fiscal_year_config(&config).await.expect("Should update config");

        let fetched = repo.get_fiscal_year_config(FiscalYear(2030)).await.expect("Should fetch");
        assert_eq!(fetched.rebate_limit, dec!(1500000));
        assert_eq!(fetched.rsu_exchange_rate, dec!(86.25));
        assert_eq!(repo.list_fiscal_years().await, Ok(vec![FiscalYear(2030)]));
    }

    #[tokio::test]
    async fn test_get_fiscal_year_config_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_fiscal_year_config(FiscalYear(1999)).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_fiscal_years_newest_first() {
        let repo = setup_test_db().await;
        for year in [2024, 2026, 2025] {
            repo.upsert_fiscal_year_config(&test_config(year)).await.expect("Should insert");
        }

        let years = repo.list_fiscal_years().await.expect("Should list");

        assert_eq!(years, vec![FiscalYear(2026), FiscalYear(2025), FiscalYear(2024)]);
    }

    // ── tax slabs ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_replace_and_get_tax_slabs() {
        let repo = setup_test_db().await;
        let slabs = TaxRules::fy_2025_26().new_regime.slabs;

        repo.replace_tax_slabs(FiscalYear(2025), Regime::New, &slabs)
            .await
            .expect("Should store slabs");
        let fetched = repo.get_tax_slabs(FiscalYear(2025), Regime::New).await.expect("Should fetch");

        assert_eq!(fetched, slabs);
        assert_eq!(fetched.last().and_then(|s| s.max), None);
    }

    #[tokio::test]
    async fn test_replace_tax_slabs_leaves_other_regime() {
        let repo = setup_test_db().await;
        let rules = TaxRules::fy_2025_26();
        repo.replace_tax_slabs(FiscalYear(2025), Regime::Old, &rules.old_regime.slabs)
            .await
            .expect("Should store old slabs");
        repo.replace_tax_slabs(FiscalYear(2025), Regime::New, &rules.new_regime.slabs)
            .await
            .expect("Should store new slabs");

        let replacement = vec![TaxSlab::new(dec!(0), None, dec!(10))];
        repo.replace_tax_slabs(FiscalYear(2025), Regime::Old, &replacement)
            .await
            .expect("Should replace old slabs");

        assert_eq!(repo.get_tax_slabs(FiscalYear(2025), Regime::Old).await, Ok(replacement));
        assert_eq!(
            repo.get_tax_slabs(FiscalYear(2025), Regime::New).await.map(|s| s.len()),
            Ok(7)
        );
    }

    #[tokio::test]
    async fn test_get_tax_slabs_empty() {
        let repo = setup_test_db().await;

        let slabs = repo.get_tax_slabs(FiscalYear(1999), Regime::Old).await.expect("Should query");

        assert!(slabs.is_empty());
    }

    // ── surcharge bands ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_replace_and_get_surcharge_bands() {
        let repo = setup_test_db().await;
        let bands = TaxRules::fy_2025_26().surcharge_bands;

        repo.replace_surcharge_bands(FiscalYear(2025), &bands).await.expect("Should store bands");
        repo.replace_surcharge_bands(FiscalYear(2025), &bands).await.expect("Should replace bands");

        assert_eq!(repo.get_surcharge_bands(FiscalYear(2025)).await, Ok(bands));
    }

    // ── whole rule tables ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_store_and_load_rules() {
        let repo = setup_test_db().await;
        let mut rules = TaxRules::fy_2025_26();
        rules.fiscal_year = FiscalYear(2026);
        rules.new_regime.rebate_amount = dec!(30000);

        repo.store_rules(&rules).await.expect("Should store rules");
        let loaded = repo.load_rules(FiscalYear(2026)).await.expect("Should load rules");

        assert_eq!(loaded, rules);
    }

    #[tokio::test]
    async fn test_load_rules_rejects_broken_tables() {
        let repo = setup_test_db().await;
        repo.upsert_fiscal_year_config(&test_config(2025)).await.expect("Should insert config");

        let result = repo.load_rules(FiscalYear(2025)).await;

        assert!(matches!(result, Err(RepositoryError::InvalidRules(_))));
    }

    // ── seeds ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_run_seeds() {
        let repo = setup_test_db().await;

        let seeds_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("seeds");
        repo.run_seeds(&seeds_dir).await.expect("Should run seeds successfully");

        let rules = repo.load_rules(FiscalYear(2025)).await.expect("Should load seeded rules");
        assert_eq!(rules, TaxRules::fy_2025_26());
    }

    #[tokio::test]
    async fn test_run_seeds_keeps_existing_tables() {
        let repo = setup_test_db().await;
        let replacement = vec![TaxSlab::new(dec!(0), None, dec!(10))];
        repo.replace_tax_slabs(FiscalYear(2025), Regime::Old, &replacement)
            .await
            .expect("Should store slabs");

        let seeds_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("seeds");
        repo.run_seeds(&seeds_dir).await.expect("Should run seeds");
        repo.run_seeds(&seeds_dir).await.expect("Seeds should be re-runnable");

        assert_eq!(repo.get_tax_slabs(FiscalYear(2025), Regime::Old).await, Ok(replacement));
        assert_eq!(
            repo.get_tax_slabs(FiscalYear(2025), Regime::New).await.map(|s| s.len()),
            Ok(7)
        );
    }

    #[tokio::test]
    async fn test_run_seeds_nonexistent_directory() {
        let repo = setup_test_db().await;

        let result = repo.run_seeds(Path::new("./nonexistent")).await;

        let err = result.expect_err("Should fail for nonexistent directory");
        assert_eq!(err.to_string(), "Failed to read seeds directory './nonexistent'");
    }
}
