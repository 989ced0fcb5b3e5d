//! Integration tests for rule-table loading against the SQLite backend.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{
    FiscalYear, FiscalYearConfig, Regime, RepositoryError, TaxRules, TaxRulesError,
    TaxRulesRepository,
};
use tax_data::{RulesLoader, RulesLoaderError};
use tax_db_sqlite::SqliteRulesRepository;

const RULES_CSV_2025: &str = include_str!("../test-data/fy_2025_26_rules.csv");

/// Migrated database with no seed data, as after `--migrate` without `--seeds`.
async fn setup_test_db_without_config() -> SqliteRulesRepository {
    let repo = SqliteRulesRepository::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

/// Migrated database holding the FY 2025-26 scalar config but no tables.
async fn setup_test_db() -> SqliteRulesRepository {
    let repo = setup_test_db_without_config().await;
    repo.upsert_fiscal_year_config(&FiscalYearConfig::from_rules(&TaxRules::fy_2025_26()))
        .await
        .expect("Failed to insert fiscal year config");
    repo
}

#[tokio::test]
async fn test_load_full_fiscal_year() {
    let repo = setup_test_db().await;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).expect("Failed to parse CSV");
    let written = RulesLoader::load(&repo, &records)
        .await
        .expect("Failed to load rule tables");

    // 4 old slabs + 7 new slabs + 4 surcharge bands
    assert_eq!(written, 15);
}

#[tokio::test]
async fn test_loaded_tables_match_built_in_rules() {
    let repo = setup_test_db().await;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).unwrap();
    RulesLoader::load(&repo, &records).await.unwrap();

    let rules = repo
        .load_rules(FiscalYear(2025))
        .await
        .expect("Failed to assemble rules");

    assert_eq!(rules, TaxRules::fy_2025_26());
}

#[tokio::test]
async fn test_load_and_retrieve_old_slabs() {
    let repo = setup_test_db().await;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).unwrap();
    RulesLoader::load(&repo, &records).await.unwrap();

    let slabs = repo
        .get_tax_slabs(FiscalYear(2025), Regime::Old)
        .await
        .expect("Failed to get old slabs");

    assert_eq!(slabs.len(), 4);
    assert_eq!(slabs[0].min, dec!(0));
    assert_eq!(slabs[0].max, Some(dec!(250000)));
    assert_eq!(slabs[0].rate, dec!(0));
    assert_eq!(slabs[2].min, dec!(500001));
    assert_eq!(slabs[2].rate, dec!(20));
    assert_eq!(slabs[3].max, None);
    assert_eq!(slabs[3].rate, dec!(30));
}

#[tokio::test]
async fn test_load_and_retrieve_surcharge_bands() {
    let repo = setup_test_db().await;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).unwrap();
    RulesLoader::load(&repo, &records).await.unwrap();

    let bands = repo
        .get_surcharge_bands(FiscalYear(2025))
        .await
        .expect("Failed to get surcharge bands");

    assert_eq!(bands.len(), 4);
    assert_eq!(bands[0].min, dec!(5000000));
    assert_eq!(bands[0].rate, dec!(10));
    assert_eq!(bands[3].min, dec!(50000001));
    assert_eq!(bands[3].max, None);
    assert_eq!(bands[3].rate, dec!(37));
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let repo = setup_test_db().await;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).unwrap();
    RulesLoader::load(&repo, &records).await.unwrap();
    RulesLoader::load(&repo, &records).await.unwrap();

    let new_slabs = repo
        .get_tax_slabs(FiscalYear(2025), Regime::New)
        .await
        .unwrap();
    assert_eq!(new_slabs.len(), 7);
}

#[tokio::test]
async fn test_partial_load_keeps_other_tables() {
    let repo = setup_test_db().await;
    repo.store_rules(&TaxRules::fy_2025_26()).await.unwrap();

    // Raise the new-regime nil slab; old slabs and surcharge stay as stored.
    let csv = "\
fiscal_year,table,min_income,max_income,rate
2025,new,0,500000,0
2025,new,500001,1000000,10
2025,new,1000001,,30
";
    let records = RulesLoader::parse(csv.as_bytes()).unwrap();
    let written = RulesLoader::load(&repo, &records).await.unwrap();
    assert_eq!(written, 3);

    let rules = repo.load_rules(FiscalYear(2025)).await.unwrap();
    assert_eq!(rules.new_regime.slabs.len(), 3);
    assert_eq!(rules.new_regime.slabs[0].max, Some(dec!(500000)));
    assert_eq!(rules.old_regime.slabs, TaxRules::fy_2025_26().old_regime.slabs);
    assert_eq!(rules.surcharge_bands, TaxRules::fy_2025_26().surcharge_bands);
}

#[tokio::test]
async fn test_invalid_table_leaves_database_untouched() {
    let repo = setup_test_db().await;
    repo.store_rules(&TaxRules::fy_2025_26()).await.unwrap();

    // Second slab starts well past where the first one ends.
    let csv = "\
fiscal_year,table,min_income,max_income,rate
2025,old,0,250000,0
2025,old,300000,,30
";
    let records = RulesLoader::parse(csv.as_bytes()).unwrap();
    let result = RulesLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(RulesLoaderError::InvalidRules(TaxRulesError::SlabGap {
            regime: Regime::Old,
            index: 1,
        }))
    ));

    let slabs = repo
        .get_tax_slabs(FiscalYear(2025), Regime::Old)
        .await
        .unwrap();
    assert_eq!(slabs, TaxRules::fy_2025_26().old_regime.slabs);
}

#[tokio::test]
async fn test_missing_fiscal_year_config_returns_error() {
    let repo = setup_test_db_without_config().await;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).unwrap();
    let result = RulesLoader::load(&repo, &records).await;

    match result {
        Err(RulesLoaderError::FiscalYearNotFound(year)) => assert_eq!(year, FiscalYear(2025)),
        other => panic!("Expected FiscalYearNotFound, got {other:?}"),
    }

    assert_eq!(
        repo.load_rules(FiscalYear(2025)).await,
        Err(RepositoryError::NotFound)
    );
}

#[tokio::test]
async fn test_load_through_trait_object() {
    let repo = setup_test_db().await;
    let dyn_repo: &dyn TaxRulesRepository = &repo;

    let records = RulesLoader::parse(RULES_CSV_2025.as_bytes()).unwrap();
    let written = RulesLoader::load(dyn_repo, &records).await.unwrap();

    assert_eq!(written, 15);
}
