//! Advisory checks on salary input.
//!
//! The calculators accept any input and clamp what they cannot use; these
//! checks flag values that are out of range or implausible before that
//! happens. At most one issue is reported per field, the first that fails.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{RsuCurrency, SalaryInput, TaxRules};

/// Lowest plausible annual basic salary.
pub const MIN_ANNUAL_BASIC: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
/// Highest plausible annual basic salary (10 crore).
pub const MAX_ANNUAL_BASIC: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
pub const MAX_RSU_SHARES_PER_QUARTER: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
pub const MIN_RSU_PRICE: Decimal = Decimal::ONE;
pub const MAX_RSU_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
pub const MIN_EXCHANGE_RATE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
pub const MAX_EXCHANGE_RATE: Decimal = Decimal::from_parts(120, 0, 0, false, 0);
pub const MAX_PAYOUT_MONTHS: usize = 4;

/// Multiple of the 80D self/family limit accepted as a plausible 80D claim.
const SECTION_80D_LIMIT_MULTIPLE: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// A problem found with one input field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("{field}: this field is required")]
    Required { field: &'static str },

    #[error("{field}: must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field}: {value} seems too low for an annual salary (minimum {min})")]
    SalaryTooLow {
        field: &'static str,
        value: Decimal,
        min: Decimal,
    },

    #[error("{field}: {value} seems unreasonably high (maximum {max})")]
    SalaryTooHigh {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("{field}: {value} exceeds the maximum allowed value of {max}")]
    AboveMaximum {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("{field}: {value} is outside the expected range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("rent_paid: {rent} seems unusually high compared to basic salary {basic}")]
    RentTooHigh { rent: Decimal, basic: Decimal },

    #[error("rsu_quarterly_months: at most {max} payout months, got {count}")]
    TooManyPayoutMonths { count: usize, max: usize },
}

impl ValidationIssue {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::Negative { field, .. }
            | Self::SalaryTooLow { field, .. }
            | Self::SalaryTooHigh { field, .. }
            | Self::AboveMaximum { field, .. }
            | Self::OutOfRange { field, .. } => field,
            Self::RentTooHigh { .. } => "rent_paid",
            Self::TooManyPayoutMonths { .. } => "rsu_quarterly_months",
        }
    }
}

/// Checks `input` against the plausibility ranges and the deduction caps in
/// `rules`. An empty result means the input looks sound.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::validation::{ValidationIssue, validate_salary_input};
/// use tax_core::{SalaryInput, TaxRules};
///
/// let rules = TaxRules::fy_2025_26();
/// let input = SalaryInput {
///     basic_salary: dec!(600000),
///     section_80c: dec!(200000),
///     ..Default::default()
/// };
///
/// let issues = validate_salary_input(&input, &rules);
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues[0].field(), "section_80c");
/// ```
pub fn validate_salary_input(
    input: &SalaryInput,
    rules: &TaxRules,
) -> Vec<ValidationIssue> {
    let limits = &rules.deduction_limits;
    let mut issues = Vec::new();

    issues.extend(check_basic_salary(input.basic_salary));

    if !input.hra.is_zero() {
        issues.extend(
            check_non_negative("hra", input.hra)
                .or_else(|| check_maximum("hra", input.hra, input.basic_salary)),
        );
    }

    if !input.rent_paid.is_zero() {
        issues.extend(check_non_negative("rent_paid", input.rent_paid).or_else(|| {
            let ceiling = input.basic_salary * Decimal::TWO;
            (!input.basic_salary.is_zero() && input.rent_paid > ceiling).then_some(
                ValidationIssue::RentTooHigh { rent: input.rent_paid, basic: input.basic_salary },
            )
        }));
    }

    for (field, value) in [
        ("special_allowance", input.special_allowance),
        ("lta", input.lta),
        ("medical_allowance", input.medical_allowance),
        ("other_allowances", input.other_allowances),
        ("perquisites", input.perquisites),
        ("other_deductions", input.other_deductions),
    ] {
        issues.extend(check_non_negative(field, value));
    }

    if !input.rsu_shares_per_quarter.is_zero() {
        let shares = input.rsu_shares_per_quarter;
        issues.extend(
            check_non_negative("rsu_shares_per_quarter", shares).or_else(|| {
                check_maximum("rsu_shares_per_quarter", shares, MAX_RSU_SHARES_PER_QUARTER)
            }),
        );
    }

    if !input.rsu_price_per_share.is_zero() {
        let price = input.rsu_price_per_share;
        issues.extend(
            check_non_negative("rsu_price_per_share", price)
                .or_else(|| check_range("rsu_price_per_share", price, MIN_RSU_PRICE, MAX_RSU_PRICE)),
        );
    }

    if input.rsu_currency == RsuCurrency::Usd && !input.rsu_exchange_rate.is_zero() {
        let rate = input.rsu_exchange_rate;
        issues.extend(check_non_negative("rsu_exchange_rate", rate).or_else(|| {
            check_range("rsu_exchange_rate", rate, MIN_EXCHANGE_RATE, MAX_EXCHANGE_RATE)
        }));
    }

    if !input.rsu_withholding_rate.is_zero() {
        let rate = input.rsu_withholding_rate;
        issues.extend(check_non_negative("rsu_withholding_rate", rate).or_else(|| {
            check_range("rsu_withholding_rate", rate, Decimal::ZERO, Decimal::ONE_HUNDRED)
        }));
    }

    for (field, value, max) in [
        ("section_80c", input.section_80c, limits.section_80c),
        (
            "section_80d",
            input.section_80d,
            limits.section_80d_self_family * SECTION_80D_LIMIT_MULTIPLE,
        ),
        ("section_24b", input.section_24b, limits.section_24b),
    ] {
        if !value.is_zero() {
            issues.extend(
                check_non_negative(field, value).or_else(|| check_maximum(field, value, max)),
            );
        }
    }

    let count = input.rsu_quarterly_months.len();
    if count > MAX_PAYOUT_MONTHS {
        issues.push(ValidationIssue::TooManyPayoutMonths { count, max: MAX_PAYOUT_MONTHS });
    }

    issues
}

fn check_basic_salary(value: Decimal) -> Option<ValidationIssue> {
    const FIELD: &str = "basic_salary";

    if value.is_zero() {
        return Some(ValidationIssue::Required { field: FIELD });
    }
    if let Some(issue) = check_non_negative(FIELD, value) {
        return Some(issue);
    }
    if value < MIN_ANNUAL_BASIC {
        return Some(ValidationIssue::SalaryTooLow { field: FIELD, value, min: MIN_ANNUAL_BASIC });
    }
    if value > MAX_ANNUAL_BASIC {
        return Some(ValidationIssue::SalaryTooHigh { field: FIELD, value, max: MAX_ANNUAL_BASIC });
    }
    None
}

fn check_non_negative(
    field: &'static str,
    value: Decimal,
) -> Option<ValidationIssue> {
    (value < Decimal::ZERO).then_some(ValidationIssue::Negative { field, value })
}

fn check_maximum(
    field: &'static str,
    value: Decimal,
    max: Decimal,
) -> Option<ValidationIssue> {
    (value > max).then_some(ValidationIssue::AboveMaximum { field, value, max })
}

fn check_range(
    field: &'static str,
    value: Decimal,
    min: Decimal,
    max: Decimal,
) -> Option<ValidationIssue> {
    (value < min || value > max).then_some(ValidationIssue::OutOfRange { field, value, min, max })
}
