use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// RSU income converted to rupees, annual and per quarterly tranche.
///
/// `dtaa_credit` is the foreign tax eligible for credit before it is capped
/// against the domestic tax on the same income.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsuDetail {
    pub gross_rsu: Decimal,
    pub us_tax_withheld: Decimal,
    pub net_rsu: Decimal,
    pub dtaa_credit: Decimal,
    pub gross_rsu_per_quarter: Decimal,
    pub us_tax_withheld_per_quarter: Decimal,
    pub net_rsu_per_quarter: Decimal,
}

impl RsuDetail {
    pub fn is_empty(&self) -> bool {
        self.gross_rsu.is_zero()
    }
}
