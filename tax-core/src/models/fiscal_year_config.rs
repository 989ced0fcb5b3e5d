use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    DeductionLimits, FiscalYear, HraRules, NewRegimeRules, OldRegimeRules, RsuDefaults,
    SurchargeBand, TaxRules, TaxSlab,
};

/// The scalar part of a [`TaxRules`] table, one row per fiscal year in
/// storage. Slabs and surcharge bands are stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYearConfig {
    pub fiscal_year: FiscalYear,
    pub old_standard_deduction: Decimal,
    pub new_standard_deduction: Decimal,
    pub rebate_limit: Decimal,
    pub rebate_amount: Decimal,
    pub cess_rate: Decimal,
    pub section_80c_limit: Decimal,
    pub section_80d_self_family_limit: Decimal,
    pub section_80d_parents_limit: Decimal,
    pub section_24b_limit: Decimal,
    pub hra_metro_percentage: Decimal,
    pub hra_non_metro_percentage: Decimal,
    pub hra_rent_basic_percentage: Decimal,
    pub provident_fund_rate: Decimal,
    pub rsu_exchange_rate: Decimal,
    pub rsu_withholding_rate: Decimal,
}

impl FiscalYearConfig {
    pub fn from_rules(rules: &TaxRules) -> Self {
        Self {
            fiscal_year: rules.fiscal_year,
            old_standard_deduction: rules.old_regime.standard_deduction,
            new_standard_deduction: rules.new_regime.standard_deduction,
            rebate_limit: rules.new_regime.rebate_limit,
            rebate_amount: rules.new_regime.rebate_amount,
            cess_rate: rules.cess_rate,
            section_80c_limit: rules.deduction_limits.section_80c,
            section_80d_self_family_limit: rules.deduction_limits.section_80d_self_family,
            section_80d_parents_limit: rules.deduction_limits.section_80d_parents,
            section_24b_limit: rules.deduction_limits.section_24b,
            hra_metro_percentage: rules.hra.metro_percentage,
            hra_non_metro_percentage: rules.hra.non_metro_percentage,
            hra_rent_basic_percentage: rules.hra.rent_basic_percentage,
            provident_fund_rate: rules.provident_fund_rate,
            rsu_exchange_rate: rules.rsu.exchange_rate,
            rsu_withholding_rate: rules.rsu.withholding_rate,
        }
    }

    /// Reassembles a full rule table. The result is not validated.
    pub fn into_rules(
        self,
        old_slabs: Vec<TaxSlab>,
        new_slabs: Vec<TaxSlab>,
        surcharge_bands: Vec<SurchargeBand>,
    ) -> TaxRules {
        TaxRules {
            fiscal_year: self.fiscal_year,
            old_regime: OldRegimeRules {
                slabs: old_slabs,
                standard_deduction: self.old_standard_deduction,
            },
            new_regime: NewRegimeRules {
                slabs: new_slabs,
                standard_deduction: self.new_standard_deduction,
                rebate_limit: self.rebate_limit,
                rebate_amount: self.rebate_amount,
            },
            surcharge_bands,
            cess_rate: self.cess_rate,
            deduction_limits: DeductionLimits {
                section_80c: self.section_80c_limit,
                section_80d_self_family: self.section_80d_self_family_limit,
                section_80d_parents: self.section_80d_parents_limit,
                section_24b: self.section_24b_limit,
            },
            hra: HraRules {
                metro_percentage: self.hra_metro_percentage,
                non_metro_percentage: self.hra_non_metro_percentage,
                rent_basic_percentage: self.hra_rent_basic_percentage,
            },
            provident_fund_rate: self.provident_fund_rate,
            rsu: RsuDefaults {
                exchange_rate: self.rsu_exchange_rate,
                withholding_rate: self.rsu_withholding_rate,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn split_and_reassemble_preserves_rules() {
        let rules = TaxRules::fy_2025_26();

        let config = FiscalYearConfig::from_rules(&rules);
        let rebuilt = config.into_rules(
            rules.old_regime.slabs.clone(),
            rules.new_regime.slabs.clone(),
            rules.surcharge_bands.clone(),
        );

        assert_eq!(rebuilt, rules);
    }
}
