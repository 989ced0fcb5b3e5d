use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas
/// (either thousands or lakh grouping).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`], accepting grouped digits such as
/// `"12,34,567.50"`. Empty input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Groups the digits of a non-negative integer string the Indian way: the
/// last three digits, then pairs (`1234567` becomes `12,34,567`).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Formats a rupee amount rounded to whole rupees with Indian digit
/// grouping and a leading `₹`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_cli::utils::format_inr;
///
/// assert_eq!(format_inr(dec!(1234567)), "₹12,34,567");
/// assert_eq!(format_inr(dec!(-98631)), "-₹98,631");
/// ```
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₹{}", group_indian(&rounded.abs().trunc().to_string()))
}

/// Formats a percentage value (already scaled to 0..=100) as `"12%"`.
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_lakh_grouping() {
        assert_eq!(parse_decimal("12,34,567").unwrap(), dec!(1234567));
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
    }

    #[test]
    fn parse_decimal_trim_and_empty() {
        assert_eq!(parse_decimal("  83.50  ").unwrap(), dec!(83.50));
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("eighty").is_err());
    }

    #[test]
    fn format_inr_groups_lakhs_and_crores() {
        assert_eq!(format_inr(dec!(0)), "₹0");
        assert_eq!(format_inr(dec!(999)), "₹999");
        assert_eq!(format_inr(dec!(1000)), "₹1,000");
        assert_eq!(format_inr(dec!(100000)), "₹1,00,000");
        assert_eq!(format_inr(dec!(12345678)), "₹1,23,45,678");
        assert_eq!(format_inr(dec!(1000000000)), "₹1,00,00,00,000");
    }

    #[test]
    fn format_inr_rounds_half_away_from_zero() {
        assert_eq!(format_inr(dec!(1499.5)), "₹1,500");
        assert_eq!(format_inr(dec!(-0.4)), "₹0");
        assert_eq!(format_inr(dec!(-2500.5)), "-₹2,501");
    }

    #[test]
    fn format_percent_drops_trailing_zeros() {
        assert_eq!(format_percent(dec!(11)), "11%");
        assert_eq!(format_percent(dec!(22.50)), "22.5%");
    }
}
