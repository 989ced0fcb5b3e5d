use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One progressive income bracket. `rate` is a percentage (5 means 5%).
/// `max` is `None` for the open-ended top slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxSlab {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { min, max, rate }
    }
}
