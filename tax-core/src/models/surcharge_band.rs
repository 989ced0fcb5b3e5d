use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A gross-income band carrying a flat surcharge rate (percent) that applies
/// to the whole pre-surcharge tax, not marginally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeBand {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl SurchargeBand {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { min, max, rate }
    }

    /// Inclusive on both ends.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min && self.max.is_none_or(|max| income <= max)
    }
}
