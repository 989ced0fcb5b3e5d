use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_core::{TaxRules, TaxRulesRepository};
use tax_data::RulesLoader;
use tax_db_sqlite::SqliteRulesRepository;
use tracing_subscriber::EnvFilter;

/// Load fiscal-year rule tables into the database.
///
/// `--rules` stores a complete rule table from a TOML document (the same
/// layout `TaxRules::to_toml_string` writes). `--file` replaces slab and
/// surcharge tables from a CSV with the columns:
/// - fiscal_year: start year or label (2025 or 2025-26)
/// - table: old, new or surcharge
/// - min_income: lower bound of the slab or band
/// - max_income: upper bound (empty for unlimited)
/// - rate: percentage (30 for 30%)
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV file of slab and surcharge rows
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a TOML document holding a complete fiscal-year rule table
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// SQLite database URL (e.g., sqlite:tax.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:tax.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    /// List the fiscal years stored after loading
    #[arg(short, long, default_value_t = false)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let repo = SqliteRulesRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    if args.file.is_none() && args.rules.is_none() && !args.list && !args.migrate {
        bail!("nothing to do: pass --rules, --file, --migrate or --list");
    }

    if let Some(path) = &args.rules {
        let document = fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        let rules = TaxRules::from_toml_str(&document)
            .with_context(|| format!("Failed to parse rules: {}", path.display()))?;

        repo.store_rules(&rules)
            .await
            .with_context(|| format!("Failed to store rules for {}", rules.fiscal_year))?;
        println!("Stored rule table for {}.", rules.fiscal_year);
    }

    if let Some(path) = &args.file {
        println!("Loading rule tables from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = RulesLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;

        println!("Parsed {} records from CSV", records.len());

        let written = RulesLoader::load(&repo, &records)
            .await
            .context("Failed to load rule tables into database")?;

        println!("Successfully loaded {written} rows into the database.");
    }

    if args.list {
        let years = repo
            .list_fiscal_years()
            .await
            .context("Failed to list fiscal years")?;
        for year in years {
            println!("{year}");
        }
    }

    Ok(())
}
