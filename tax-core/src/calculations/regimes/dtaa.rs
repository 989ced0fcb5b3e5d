//! DTAA credit for tax withheld abroad on RSU income.
//!
//! The credit may not exceed the Indian tax attributable to the RSU income.
//! Attribution is proportional: the RSU share of taxable income takes the
//! same share of the slab tax, and surcharge and cess follow the slab tax.

use rust_decimal::Decimal;

use crate::calculations::common::{min, proportion, round_rupee};

/// Slab tax attributable to the net RSU income, unrounded.
///
/// Zero when there is no RSU income or no taxable income.
pub fn rsu_tax_share(
    tax: Decimal,
    net_rsu: Decimal,
    taxable_income: Decimal,
) -> Decimal {
    if net_rsu <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    proportion(tax, net_rsu, taxable_income)
}

/// Credit applied against the Indian liability, rounded to rupees.
///
/// The smallest of the foreign tax withheld, the Indian tax attributable to
/// the RSU income (slab share plus the matching share of surcharge and
/// cess), and the whole liability. Zero when there is no slab tax.
pub fn applied_credit(
    foreign_tax: Decimal,
    tax: Decimal,
    surcharge: Decimal,
    cess: Decimal,
    rsu_tax: Decimal,
) -> Decimal {
    if tax <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let attributable =
        rsu_tax + proportion(surcharge, rsu_tax, tax) + proportion(cess, rsu_tax, tax);
    let liability = tax + surcharge + cess;

    round_rupee(min(min(foreign_tax, attributable), liability))
}
