use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    FiscalYear, FiscalYearConfig, Regime, SurchargeBand, TaxRules, TaxRulesError, TaxSlab,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Stored rules are invalid: {0}")]
    InvalidRules(#[from] TaxRulesError),
}

/// Storage for fiscal-year rule tables.
///
/// Only rule tables are stored. Calculation results are never persisted.
#[async_trait]
pub trait TaxRulesRepository: Send + Sync {
    // Fiscal year config
    async fn get_fiscal_year_config(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<FiscalYearConfig, RepositoryError>;
    async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, RepositoryError>;
    async fn upsert_fiscal_year_config(
        &self,
        config: &FiscalYearConfig,
    ) -> Result<(), RepositoryError>;

    // Tax slabs
    async fn get_tax_slabs(
        &self,
        fiscal_year: FiscalYear,
        regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError>;

    /// Replaces every slab of `regime` for `fiscal_year` with `slabs`.
    async fn replace_tax_slabs(
        &self,
        fiscal_year: FiscalYear,
        regime: Regime,
        slabs: &[TaxSlab],
    ) -> Result<(), RepositoryError>;

    // Surcharge bands
    async fn get_surcharge_bands(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<Vec<SurchargeBand>, RepositoryError>;

    async fn replace_surcharge_bands(
        &self,
        fiscal_year: FiscalYear,
        bands: &[SurchargeBand],
    ) -> Result<(), RepositoryError>;

    /// Assembles and validates the full rule table for `fiscal_year`.
    ///
    /// # Errors
    /// * [`RepositoryError::NotFound`] when the fiscal year is not stored.
    /// * [`RepositoryError::InvalidRules`] when the stored tables fail
    ///   [`TaxRules::validate`].
    async fn load_rules(
        &self,
        fiscal_year: FiscalYear,
    ) -> Result<TaxRules, RepositoryError> {
        let config = self.get_fiscal_year_config(fiscal_year).await?;
        let old_slabs = self.get_tax_slabs(fiscal_year, Regime::Old).await?;
        let new_slabs = self.get_tax_slabs(fiscal_year, Regime::New).await?;
        let bands = self.get_surcharge_bands(fiscal_year).await?;

        debug!(
            %fiscal_year,
            old_slabs = old_slabs.len(),
            new_slabs = new_slabs.len(),
            surcharge_bands = bands.len(),
            "loaded rule tables"
        );

        let rules = config.into_rules(old_slabs, new_slabs, bands);
        rules.validate()?;
        Ok(rules)
    }

    /// Stores every table of `rules`, replacing what was there for its
    /// fiscal year.
    async fn store_rules(
        &self,
        rules: &TaxRules,
    ) -> Result<(), RepositoryError> {
        rules.validate()?;

        self.upsert_fiscal_year_config(&FiscalYearConfig::from_rules(rules)).await?;
        self.replace_tax_slabs(rules.fiscal_year, Regime::Old, &rules.old_regime.slabs).await?;
        self.replace_tax_slabs(rules.fiscal_year, Regime::New, &rules.new_regime.slabs).await?;
        self.replace_surcharge_bands(rules.fiscal_year, &rules.surcharge_bands).await
    }
}
