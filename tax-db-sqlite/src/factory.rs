use std::path::PathBuf;

use async_trait::async_trait;
use tax_core::db::repository::{RepositoryError, TaxRulesRepository};
use tax_core::db::{DbConfig, RepositoryFactory};
use tracing::debug;

use crate::repository::SqliteRulesRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`TAX_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **Crate manifest dir**, `$CARGO_MANIFEST_DIR/seeds`, for runs from the
///    build tree.
pub fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAX_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`tax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, run the
    /// migrations and apply the seed files.
    ///
    /// Accepted connection strings are sqlx SQLite URLs (`sqlite:rules.db`,
    /// `sqlite::memory:`) or bare file paths. Files are created if missing.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRulesRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        debug!(%url, "opening sqlite rules repository");

        let repo = SqliteRulesRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations().await.map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

/// Map a connection string to a sqlx URL.
fn database_url(connection_string: &str) -> String {
    if connection_string.starts_with("sqlite:") {
        connection_string.to_string()
    } else if connection_string == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{connection_string}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tax_core::db::{DbConfig, RepositoryFactory};
    use tax_core::{FiscalYear, TaxRules, TaxRulesRepository};

    use super::{SqliteRepositoryFactory, database_url};

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn database_url_accepts_urls_and_paths() {
        assert_eq!(database_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
        assert_eq!(database_url("sqlite:rules.db"), "sqlite:rules.db");
        assert_eq!(database_url("rules.db"), "sqlite://rules.db");
    }

    /// Factory → migrated, seeded in-memory repository.
    #[tokio::test]
    async fn creates_seeded_in_memory_repository() {
        let config = DbConfig::default();

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("failed to create in-memory repository");

        assert_eq!(repo.list_fiscal_years().await, Ok(vec![FiscalYear(2025)]));
        assert_eq!(repo.load_rules(FiscalYear(2025)).await, Ok(TaxRules::fy_2025_26()));
    }
}
