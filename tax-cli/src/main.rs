use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use tax_cli::app::{self, CalculateOptions};
use tax_cli::input::RulesSource;
use tax_cli::logging::{self, LogSettings};
use tax_cli::utils::parse_decimal;
use tax_core::FiscalYear;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Indian salary tax calculator comparing the old and new regimes.
#[derive(Debug, Parser)]
#[command(name = "salary-tax", version, about)]
struct Cli {
    /// Log filter: a level (error, warn, info, debug, trace) or any
    /// RUST_LOG-style directive.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Keep log output off the terminal (the log file still receives it).
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the annual summary and regime comparison.
    Calculate {
        /// Salary input: a .toml document or a .csv file with one row per person.
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        rules: RulesArgs,

        /// Also print the April to March monthly projection.
        #[arg(short, long)]
        monthly: bool,

        /// Write the monthly projection to this CSV file.
        #[arg(long)]
        csv_out: Option<PathBuf>,

        /// Override the USD to INR rate of every input (e.g. 84.50).
        #[arg(long, value_parser = parse_decimal)]
        exchange_rate: Option<Decimal>,
    },

    /// Check inputs against the plausibility rules.
    Validate {
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        rules: RulesArgs,
    },

    /// Print the active rule table as TOML.
    Rules {
        #[command(flatten)]
        rules: RulesArgs,
    },
}

#[derive(Debug, Args)]
struct RulesArgs {
    /// Rule table TOML document. Defaults to the built-in FY 2025-26 table.
    #[arg(long, conflicts_with = "db")]
    rules: Option<PathBuf>,

    /// Rules database (SQLite file path or sqlx URL).
    #[arg(long)]
    db: Option<String>,

    /// Fiscal year to read from the database, as 2025 or 2025-26.
    #[arg(long, requires = "db", value_parser = parse_fiscal_year)]
    year: Option<FiscalYear>,
}

impl RulesArgs {
    fn source(&self) -> RulesSource<'_> {
        match (&self.rules, &self.db) {
            (Some(path), _) => RulesSource::File(path),
            (None, Some(connection)) => RulesSource::Database {
                connection,
                fiscal_year: self.year.unwrap_or(FiscalYear(2025)),
            },
            (None, None) => RulesSource::BuiltIn,
        }
    }
}

fn parse_fiscal_year(s: &str) -> Result<FiscalYear, String> {
    FiscalYear::parse(s).ok_or_else(|| format!("invalid fiscal year '{s}' (expected 2025 or 2025-26)"))
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init_default_logging();

    let cli = Cli::parse();

    logging::apply(&LogSettings {
        level: cli.log_level.as_deref(),
        file: cli.log_file.as_deref(),
        quiet: cli.quiet,
    })?;
    debug!(?cli, "parsed arguments");

    match &cli.command {
        Command::Calculate {
            input,
            rules,
            monthly,
            csv_out,
            exchange_rate,
        } => {
            let options = CalculateOptions {
                input,
                rules: rules.source(),
                monthly: *monthly,
                csv_out: csv_out.as_deref(),
                exchange_rate: *exchange_rate,
            };
            print!("{}", app::calculate(&options).await?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { input, rules } => {
            let outcome = app::validate(input, &rules.source()).await?;
            print!("{}", outcome.text);
            Ok(if outcome.issue_count == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Rules { rules } => {
            print!("{}", app::show_rules(&rules.source()).await?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
