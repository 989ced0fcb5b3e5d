//! Command implementations. Each returns the text to print so the binary
//! stays a thin clap wrapper.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tax_core::{TaxCalculator, TaxReport, validate_salary_input};
use tracing::{info, warn};

use crate::input::{RulesSource, load_rules, load_salary_inputs};
use crate::report::{render_issues, render_monthly, render_summary, write_monthly_csv};

/// Options for the `calculate` command.
#[derive(Debug, Clone)]
pub struct CalculateOptions<'a> {
    pub input: &'a Path,
    pub rules: RulesSource<'a>,
    pub monthly: bool,
    pub csv_out: Option<&'a Path>,
    /// Replaces the USD to INR rate of every input.
    pub exchange_rate: Option<Decimal>,
}

/// Result of the `validate` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub text: String,
    pub issue_count: usize,
}

/// Computes the summary (and optionally the monthly projection) for every
/// input in the file.
pub async fn calculate(options: &CalculateOptions<'_>) -> Result<String> {
    let rules = load_rules(&options.rules).await?;
    let mut records = load_salary_inputs(options.input, &rules)?;
    if let Some(rate) = options.exchange_rate {
        for record in &mut records {
            record.input.rsu_exchange_rate = rate;
        }
    }
    let calculator = TaxCalculator::new(rules);

    let reports: Vec<(Option<&str>, TaxReport)> = records
        .iter()
        .map(|record| (record.name.as_deref(), calculator.report(&record.input)))
        .collect();
    info!(inputs = reports.len(), "calculated reports");

    let mut out = String::new();
    for (index, (name, report)) in reports.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&render_summary(&report.summary, *name));
        if options.monthly {
            out.push('\n');
            out.push_str(&render_monthly(&report.months));
        }
    }

    if let Some(path) = options.csv_out {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV: {}", path.display()))?;
        write_monthly_csv(
            BufWriter::new(file),
            reports
                .iter()
                .map(|(name, report)| (*name, &report.months[..])),
        )
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
        info!(path = %path.display(), "monthly projection written");
    }

    Ok(out)
}

/// Checks every input in the file against the plausibility rules.
pub async fn validate(
    input: &Path,
    rules: &RulesSource<'_>,
) -> Result<ValidationOutcome> {
    let rules = load_rules(rules).await?;
    let records = load_salary_inputs(input, &rules)?;

    let mut text = String::new();
    let mut issue_count = 0;
    for (index, record) in records.iter().enumerate() {
        let issues = validate_salary_input(&record.input, &rules);
        if !issues.is_empty() {
            warn!(row = index + 1, issues = issues.len(), "input has validation issues");
        }
        issue_count += issues.len();

        let label = match &record.name {
            Some(name) => name.clone(),
            None if records.len() > 1 => format!("row {}", index + 1),
            None => "input".to_string(),
        };
        text.push_str(&render_issues(&issues, Some(&label)));
    }

    Ok(ValidationOutcome { text, issue_count })
}

/// The active rule table as a TOML document.
pub async fn show_rules(rules: &RulesSource<'_>) -> Result<String> {
    let rules = load_rules(rules).await?;
    rules
        .to_toml_string()
        .context("Failed to serialize rules")
}
