//! RSU conversion to rupees.
//!
//! Grants vest quarterly. The annual figure is always four tranches; which
//! months the tranches land in only matters to the monthly breakdown.
//!
//! | Figure      | Formula                                        |
//! |-------------|------------------------------------------------|
//! | per quarter | shares × price (× exchange rate for USD)       |
//! | gross       | per quarter × 4                                |
//! | withheld    | gross × withholding rate / 100                 |
//! | net         | gross − withheld                               |
//! | DTAA credit | withheld, before capping against Indian tax    |
//!
//! Every figure is rounded from the unrounded intermediates, so net is not
//! necessarily gross minus withheld after rounding.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{percent_of, round_rupee};
use crate::models::{RsuCurrency, RsuDetail, SalaryInput};

/// Number of RSU tranches per fiscal year.
pub const QUARTERS_PER_YEAR: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Converts the input's RSU grant into annual and per-quarter rupee figures.
///
/// Returns an all-zero [`RsuDetail`] when no shares vest.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::rsu_details;
/// use tax_core::{RsuCurrency, SalaryInput};
///
/// let input = SalaryInput {
///     rsu_shares_per_quarter: dec!(100),
///     rsu_price_per_share: dec!(10),
///     rsu_currency: RsuCurrency::Usd,
///     rsu_exchange_rate: dec!(83),
///     rsu_withholding_rate: dec!(22),
///     ..Default::default()
/// };
///
/// let rsu = rsu_details(&input);
/// assert_eq!(rsu.gross_rsu, dec!(332000));
/// assert_eq!(rsu.us_tax_withheld, dec!(73040));
/// assert_eq!(rsu.net_rsu, dec!(258960));
/// ```
pub fn rsu_details(input: &SalaryInput) -> RsuDetail {
    if input.rsu_shares_per_quarter <= Decimal::ZERO {
        return RsuDetail::default();
    }

    let per_quarter = match input.rsu_currency {
        RsuCurrency::Inr => input.rsu_shares_per_quarter * input.rsu_price_per_share,
        RsuCurrency::Usd => {
            input.rsu_shares_per_quarter * input.rsu_price_per_share * input.rsu_exchange_rate
        }
    };
    let withheld_per_quarter = percent_of(per_quarter, input.rsu_withholding_rate);

    let gross = per_quarter * QUARTERS_PER_YEAR;
    let withheld = percent_of(gross, input.rsu_withholding_rate);
    let net = gross - withheld;

    debug!(
        currency = %input.rsu_currency,
        %per_quarter,
        %gross,
        %withheld,
        "converted RSU grant"
    );

    RsuDetail {
        gross_rsu: round_rupee(gross),
        us_tax_withheld: round_rupee(withheld),
        net_rsu: round_rupee(net),
        dtaa_credit: round_rupee(withheld),
        gross_rsu_per_quarter: round_rupee(per_quarter),
        us_tax_withheld_per_quarter: round_rupee(withheld_per_quarter),
        net_rsu_per_quarter: round_rupee(per_quarter - withheld_per_quarter),
    }
}
