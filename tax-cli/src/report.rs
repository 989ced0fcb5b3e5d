//! Plain-text and CSV rendering of calculation results.

use std::fmt::Write as _;
use std::io;

use anyhow::Result;
use rust_decimal::Decimal;
use tax_core::{AnnualSummary, MonthlyRecord, Regime, RegimeSummary, ValidationIssue};

use crate::utils::{format_inr, format_percent};

const LABEL_WIDTH: usize = 24;
const COLUMN_WIDTH: usize = 16;

fn regime_label(regime: Regime) -> &'static str {
    match regime {
        Regime::Old => "Old regime",
        Regime::New => "New regime",
    }
}

fn push_row(
    out: &mut String,
    label: &str,
    old: &str,
    new: &str,
) {
    let _ = writeln!(
        out,
        "{label:<LABEL_WIDTH$}{old:>COLUMN_WIDTH$}{new:>COLUMN_WIDTH$}"
    );
}

fn push_amount_row(
    out: &mut String,
    label: &str,
    summary: &AnnualSummary,
    field: impl Fn(&RegimeSummary) -> Decimal,
) {
    push_row(
        out,
        label,
        &format_inr(field(&summary.old_regime)),
        &format_inr(field(&summary.new_regime)),
    );
}

/// Renders the annual summary and regime comparison.
pub fn render_summary(
    summary: &AnnualSummary,
    name: Option<&str>,
) -> String {
    let mut out = String::new();

    match name {
        Some(name) => {
            let _ = writeln!(out, "{name}: {} salary tax summary", summary.fiscal_year);
        }
        None => {
            let _ = writeln!(out, "{} salary tax summary", summary.fiscal_year);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<LABEL_WIDTH$}{}",
        "Gross salary",
        format_inr(summary.gross_salary)
    );
    if summary.rsu.gross_rsu > Decimal::ZERO {
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}{}",
            "  without RSU",
            format_inr(summary.gross_salary_without_rsu)
        );
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}{}",
            "RSU gross",
            format_inr(summary.rsu.gross_rsu)
        );
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}{}",
            "  US tax withheld",
            format_inr(summary.rsu.us_tax_withheld)
        );
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}{}",
            "  net RSU",
            format_inr(summary.rsu.net_rsu)
        );
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}{}",
            "  DTAA credit",
            format_inr(summary.rsu.dtaa_credit)
        );
    }
    let _ = writeln!(out);

    push_row(
        &mut out,
        "",
        regime_label(Regime::Old),
        regime_label(Regime::New),
    );
    push_amount_row(&mut out, "Deductions", summary, |r| r.deductions);
    push_amount_row(&mut out, "Taxable income", summary, |r| r.taxable_income);
    push_amount_row(&mut out, "Slab tax", summary, |r| r.tax);
    push_amount_row(&mut out, "Rebate (87A)", summary, |r| r.rebate);
    push_amount_row(&mut out, "Surcharge", summary, |r| r.surcharge);
    push_amount_row(&mut out, "Cess", summary, |r| r.cess);
    push_amount_row(&mut out, "DTAA credit", summary, |r| r.dtaa_credit);
    push_amount_row(&mut out, "Total tax", summary, |r| r.total_tax);
    push_amount_row(&mut out, "Net salary", summary, |r| r.net_salary);
    push_row(
        &mut out,
        "Tax share of gross",
        &format_percent(summary.tax_share_percent(Regime::Old)),
        &format_percent(summary.tax_share_percent(Regime::New)),
    );
    let _ = writeln!(out);

    let recommended = regime_label(summary.recommended_regime);
    if summary.savings.is_zero() {
        let _ = writeln!(out, "Recommended: {recommended} (both regimes cost the same)");
    } else {
        let _ = writeln!(
            out,
            "Recommended: {recommended}, saving {} a year",
            format_inr(summary.savings.abs())
        );
    }

    out
}

/// Renders the twelve-month projection as a fixed-width table.
pub fn render_monthly(months: &[MonthlyRecord]) -> String {
    let mut out = String::new();
    let headers = [
        "Month", "Gross", "Net RSU", "PF", "Tax (old)", "Tax (new)", "Net (old)", "Net (new)",
    ];

    let _ = write!(out, "{:<10}", headers[0]);
    for header in &headers[1..] {
        let _ = write!(out, "{header:>14}");
    }
    let _ = writeln!(out);

    for record in months {
        let _ = write!(out, "{:<10}", record.month.name());
        for amount in [
            record.gross_salary,
            record.net_rsu,
            record.provident_fund,
            record.income_tax_old,
            record.income_tax_new,
            record.net_salary_old,
            record.net_salary_new,
        ] {
            let _ = write!(out, "{:>14}", format_inr(amount));
        }
        let _ = writeln!(out);
    }

    if let Some(last) = months.last() {
        let _ = write!(out, "{:<10}", "Total");
        for amount in [
            last.cumulative_gross_salary,
            last.cumulative_net_rsu,
            last.cumulative_provident_fund,
            last.cumulative_tax_old,
            last.cumulative_tax_new,
            last.cumulative_gross_salary
                - last.cumulative_provident_fund
                - last.cumulative_tax_old,
            last.cumulative_gross_salary
                - last.cumulative_provident_fund
                - last.cumulative_tax_new,
        ] {
            let _ = write!(out, "{:>14}", format_inr(amount));
        }
        let _ = writeln!(out);
    }

    out
}

/// Renders validation issues, one per line, under an optional row label.
pub fn render_issues(
    issues: &[ValidationIssue],
    name: Option<&str>,
) -> String {
    let label = name.unwrap_or("input");
    if issues.is_empty() {
        return format!("{label}: no issues\n");
    }

    let mut out = format!("{label}: {} issue(s)\n", issues.len());
    for issue in issues {
        let _ = writeln!(out, "  - {issue}");
    }
    out
}

const CSV_HEADERS: [&str; 22] = [
    "name",
    "month",
    "month_number",
    "period_start",
    "basic",
    "hra",
    "allowances",
    "gross_salary",
    "has_rsu_payout",
    "gross_rsu",
    "us_tax_withheld",
    "net_rsu",
    "provident_fund",
    "income_tax_old",
    "income_tax_new",
    "net_salary_old",
    "net_salary_new",
    "cumulative_gross_salary",
    "cumulative_provident_fund",
    "cumulative_tax_old",
    "cumulative_tax_new",
    "cumulative_net_rsu",
];

/// Writes monthly projections as CSV, one row per month, with the row
/// label of each projection in the `name` column.
pub fn write_monthly_csv<'a, W: io::Write>(
    writer: W,
    projections: impl IntoIterator<Item = (Option<&'a str>, &'a [MonthlyRecord])>,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADERS)?;

    for (name, months) in projections {
        for record in months {
            let period_start = record
                .period_start
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();

            csv_writer.write_record([
                name.unwrap_or_default().to_string(),
                record.month.name().to_string(),
                record.month_number.to_string(),
                period_start,
                record.basic.to_string(),
                record.hra.to_string(),
                record.allowances.to_string(),
                record.gross_salary.to_string(),
                record.has_rsu_payout.to_string(),
                record.gross_rsu.to_string(),
                record.us_tax_withheld.to_string(),
                record.net_rsu.to_string(),
                record.provident_fund.to_string(),
                record.income_tax_old.to_string(),
                record.income_tax_new.to_string(),
                record.net_salary_old.to_string(),
                record.net_salary_new.to_string(),
                record.cumulative_gross_salary.to_string(),
                record.cumulative_provident_fund.to_string(),
                record.cumulative_tax_old.to_string(),
                record.cumulative_tax_new.to_string(),
                record.cumulative_net_rsu.to_string(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
