//! Old and new regime calculators.
//!
//! Both regimes share the same pipeline and differ only in how taxable
//! income is derived and whether a rebate applies:
//!
//! | Step             | Old regime                               | New regime                    |
//! |------------------|------------------------------------------|-------------------------------|
//! | Gross salary     | components + net RSU                     | components + net RSU          |
//! | Deductions       | standard, HRA, 80C, 80D, 24(b), other    | standard only                 |
//! | Slab tax         | old slabs                                | new slabs, less 87A rebate    |
//! | Surcharge        | band on gross salary × slab tax          | same                          |
//! | Cess             | 4% of tax + surcharge                    | same                          |
//! | DTAA credit      | capped at tax attributable to RSU        | same                          |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{NewRegime, OldRegime, RegimeCalculator};
//! use tax_core::{SalaryInput, TaxRules};
//!
//! let rules = TaxRules::fy_2025_26();
//! let input = SalaryInput {
//!     basic_salary: dec!(500000),
//!     ..Default::default()
//! };
//!
//! let old = OldRegime::new(&rules).calculate(&input);
//! assert_eq!(old.taxable_income, dec!(450000));
//! assert_eq!(old.total_tax, dec!(10400));
//!
//! let new = NewRegime::new(&rules).calculate(&input);
//! assert_eq!(new.taxable_income, dec!(425000));
//! assert_eq!(new.total_tax, dec!(0));
//! ```

mod dtaa;
mod new;
mod old;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::max;
use crate::calculations::rsu::rsu_details;
use crate::calculations::salary::gross_salary_with;
use crate::calculations::surcharge::{cess, surcharge};
use crate::models::{Regime, RegimeResult, RsuDetail, SalaryInput, TaxRules};

pub use dtaa::{applied_credit, rsu_tax_share};
pub use new::NewRegime;
pub use old::{OldRegime, old_regime_deductions};

/// Slab tax and the rebate reported alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabOutcome {
    /// Slab tax after the rebate.
    pub tax: Decimal,
    pub rebate: Decimal,
}

/// A statutory regime's view of a salary.
pub trait RegimeCalculator {
    fn regime(&self) -> Regime;

    fn rules(&self) -> &TaxRules;

    /// Taxable income for a salary whose gross has already been computed.
    fn taxable_income_from_gross(
        &self,
        input: &SalaryInput,
        gross_salary: Decimal,
    ) -> Decimal;

    /// Slab tax on `taxable_income`, with any rebate applied.
    fn slab_tax(
        &self,
        taxable_income: Decimal,
    ) -> SlabOutcome;

    /// Taxable income under this regime. Never negative.
    fn taxable_income(
        &self,
        input: &SalaryInput,
    ) -> Decimal {
        let rsu = rsu_details(input);
        self.taxable_income_from_gross(input, gross_salary_with(input, &rsu))
    }

    /// Full tax breakdown under this regime.
    fn calculate(
        &self,
        input: &SalaryInput,
    ) -> RegimeResult {
        self.calculate_with_rsu(input, &rsu_details(input))
    }

    /// [`calculate`](Self::calculate) with an already converted RSU grant.
    fn calculate_with_rsu(
        &self,
        input: &SalaryInput,
        rsu: &RsuDetail,
    ) -> RegimeResult {
        let regime = self.regime();
        let gross = gross_salary_with(input, rsu);
        if gross <= Decimal::ZERO {
            return RegimeResult::zero(regime);
        }

        let taxable_income = self.taxable_income_from_gross(input, gross);
        let SlabOutcome { tax, rebate } = self.slab_tax(taxable_income);
        let result = apply_levies(self.rules(), regime, gross, taxable_income, tax, rebate, rsu);

        debug!(
            %regime,
            %gross,
            taxable_income = %result.taxable_income,
            tax = %result.tax,
            surcharge = %result.surcharge,
            cess = %result.cess,
            dtaa_credit = %result.dtaa_credit,
            total_tax = %result.total_tax,
            "calculated regime"
        );

        result
    }
}

/// Surcharge, cess and DTAA credit on top of the slab tax.
fn apply_levies(
    rules: &TaxRules,
    regime: Regime,
    gross_salary: Decimal,
    taxable_income: Decimal,
    tax: Decimal,
    rebate: Decimal,
    rsu: &RsuDetail,
) -> RegimeResult {
    let surcharge = surcharge(gross_salary, tax, &rules.surcharge_bands);
    let cess = cess(tax + surcharge, rules.cess_rate);

    let rsu_tax = rsu_tax_share(tax, rsu.net_rsu, taxable_income);
    let dtaa_credit = applied_credit(rsu.dtaa_credit, tax, surcharge, cess, rsu_tax);

    RegimeResult {
        regime,
        taxable_income,
        tax,
        rebate,
        surcharge,
        cess,
        dtaa_credit,
        total_tax: max(Decimal::ZERO, tax + surcharge + cess - dtaa_credit),
    }
}
