use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Regime;

/// Tax breakdown under one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeResult {
    pub regime: Regime,
    pub taxable_income: Decimal,

    /// Slab tax, after the rebate where one applies.
    pub tax: Decimal,

    /// Section 87A rebate. Always zero under the old regime.
    pub rebate: Decimal,

    pub surcharge: Decimal,
    pub cess: Decimal,

    /// DTAA credit actually applied, after capping.
    pub dtaa_credit: Decimal,

    /// `tax + surcharge + cess - dtaa_credit`, never negative.
    pub total_tax: Decimal,
}

impl RegimeResult {
    /// A result with every amount zero.
    pub fn zero(regime: Regime) -> Self {
        Self {
            regime,
            taxable_income: Decimal::ZERO,
            tax: Decimal::ZERO,
            rebate: Decimal::ZERO,
            surcharge: Decimal::ZERO,
            cess: Decimal::ZERO,
            dtaa_credit: Decimal::ZERO,
            total_tax: Decimal::ZERO,
        }
    }
}
