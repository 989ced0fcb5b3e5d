//! Tax calculations for Indian salary income.
//!
//! Leaf calculators ([`tax_by_slabs`], [`surcharge`], [`cess`],
//! [`hra_exemption`], [`rsu_details`]) feed the two regime calculators,
//! which in turn feed the annual summary and monthly breakdown builders.

pub mod common;
pub mod hra;
pub mod monthly;
pub mod regimes;
pub mod rsu;
pub mod salary;
pub mod slabs;
pub mod summary;
pub mod surcharge;

pub use hra::hra_exemption;
pub use monthly::{MONTHS_PER_YEAR, MonthlyBreakdownBuilder};
pub use regimes::{
    NewRegime, OldRegime, RegimeCalculator, SlabOutcome, applied_credit, old_regime_deductions,
    rsu_tax_share,
};
pub use rsu::{QUARTERS_PER_YEAR, rsu_details};
pub use salary::gross_salary;
pub use slabs::tax_by_slabs;
pub use summary::AnnualSummaryBuilder;
pub use surcharge::{cess, surcharge};
