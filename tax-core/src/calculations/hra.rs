//! House rent allowance exemption.

use rust_decimal::Decimal;

use crate::calculations::common::{max, min};
use crate::models::HraRules;

/// Exempt portion of the house rent allowance.
///
/// `min(hra, max(rent - 10% of basic, 50% of basic in a metro, else 40%))`.
///
/// The nesting is exactly as written, so when rent falls short of 10% of basic
/// the percentage-of-basic term still applies. The result is neither rounded
/// nor clamped: with a negative `hra` it goes negative, and callers reusing
/// this outside the old-regime calculator clamp it themselves.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::hra_exemption;
/// use tax_core::TaxRules;
///
/// let rules = TaxRules::fy_2025_26();
///
/// // rent - 10% basic = 90000, 50% basic = 300000, capped at HRA received
/// let exempt = hra_exemption(dec!(120000), dec!(600000), dec!(150000), true, &rules.hra);
/// assert_eq!(exempt, dec!(120000));
/// ```
pub fn hra_exemption(
    hra: Decimal,
    basic_salary: Decimal,
    rent_paid: Decimal,
    is_metro_city: bool,
    rules: &HraRules,
) -> Decimal {
    let excess_rent = rent_paid - rules.rent_basic_percentage * basic_salary;
    let share_of_basic = if is_metro_city {
        rules.metro_percentage * basic_salary
    } else {
        rules.non_metro_percentage * basic_salary
    };

    min(hra, max(excess_rent, share_of_basic))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxRules;

    fn rules() -> HraRules {
        TaxRules::fy_2025_26().hra
    }

    #[test]
    fn capped_at_hra_received() {
        let result = hra_exemption(dec!(100000), dec!(500000), dec!(300000), true, &rules());

        assert_eq!(result, dec!(100000));
    }

    #[test]
    fn metro_uses_half_of_basic() {
        // max(60000 - 50000, 250000) = 250000
        let result = hra_exemption(dec!(400000), dec!(500000), dec!(60000), true, &rules());

        assert_eq!(result, dec!(250000));
    }

    #[test]
    fn non_metro_uses_forty_percent_of_basic() {
        let result = hra_exemption(dec!(400000), dec!(500000), dec!(60000), false, &rules());

        assert_eq!(result, dec!(200000));
    }

    #[test]
    fn excess_rent_wins_when_larger() {
        // max(900000 - 50000, 200000) = 850000
        let result = hra_exemption(dec!(1000000), dec!(500000), dec!(900000), false, &rules());

        assert_eq!(result, dec!(850000));
    }

    #[test]
    fn result_is_not_rounded() {
        let result = hra_exemption(dec!(999999), dec!(100001), dec!(0), false, &rules());

        assert_eq!(result, dec!(40000.40));
    }

    #[test]
    fn never_exceeds_hra_received() {
        let rules = rules();
        let amounts = [dec!(0), dec!(30000), dec!(60000), dec!(240000), dec!(500000), dec!(2000000)];

        for hra in amounts {
            for basic in amounts {
                for rent in amounts {
                    for metro in [true, false] {
                        let exempt = hra_exemption(hra, basic, rent, metro, &rules);

                        assert!(exempt <= hra, "hra={hra} basic={basic} rent={rent} metro={metro}");
                        assert!(exempt >= dec!(0), "hra={hra} basic={basic} rent={rent} metro={metro}");
                    }
                }
            }
        }
    }
}
