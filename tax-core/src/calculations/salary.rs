//! Gross salary.

use rust_decimal::Decimal;

use crate::calculations::rsu::rsu_details;
use crate::models::{RsuDetail, SalaryInput};

/// Gross salary: the seven cash components plus the rounded net RSU.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::gross_salary;
/// use tax_core::SalaryInput;
///
/// let input = SalaryInput {
///     basic_salary: dec!(1000000),
///     rsu_shares_per_quarter: dec!(100),
///     rsu_price_per_share: dec!(1000),
///     ..Default::default()
/// };
///
/// assert_eq!(gross_salary(&input), dec!(1312000));
/// ```
pub fn gross_salary(input: &SalaryInput) -> Decimal {
    gross_salary_with(input, &rsu_details(input))
}

/// [`gross_salary`] with an already converted RSU grant.
pub(crate) fn gross_salary_with(
    input: &SalaryInput,
    rsu: &RsuDetail,
) -> Decimal {
    input.salary_components_total() + rsu.net_rsu
}
