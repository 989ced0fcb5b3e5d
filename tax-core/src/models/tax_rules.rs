//! Fiscal-year tax rule tables.
//!
//! Every constant the engine consumes lives in [`TaxRules`]: slab tables,
//! standard deductions, the Section 87A rebate, surcharge bands, cess, the
//! old-regime deduction caps, HRA percentages, the provident fund rate and
//! the RSU defaults. Swapping fiscal years means swapping this value; the
//! algorithms never change.
//!
//! Rules can come from three places:
//!
//! - [`TaxRules::fy_2025_26`], the built-in FY 2025-26 table;
//! - a TOML document via [`TaxRules::from_toml_str`];
//! - a [`TaxRulesRepository`](crate::db::TaxRulesRepository) backend.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::TaxRules;
//!
//! let rules = TaxRules::fy_2025_26();
//!
//! assert!(rules.validate().is_ok());
//! assert_eq!(rules.new_regime.standard_deduction, dec!(75000));
//! assert_eq!(rules.new_regime.rebate_limit, dec!(1200000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FiscalYear, Regime, SurchargeBand, TaxSlab};

/// Errors raised when a rule table is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRulesError {
    /// The TOML document could not be deserialized.
    #[error("invalid tax rules document: {0}")]
    Parse(String),

    #[error("{0} regime has no tax slabs")]
    EmptySlabs(Regime),

    #[error("{0} regime slabs must start at zero income")]
    SlabsNotFromZero(Regime),

    /// A slab does not start where (or one rupee after) the previous one ends.
    #[error("{regime} regime slab {index} is not contiguous with the previous slab")]
    SlabGap { regime: Regime, index: usize },

    #[error("{regime} regime slab {index} has max below min")]
    InvertedSlab { regime: Regime, index: usize },

    #[error("{regime} regime slab {index} is unbounded but not the last slab")]
    UnboundedSlabNotLast { regime: Regime, index: usize },

    #[error("{0} regime top slab must be unbounded")]
    BoundedTopSlab(Regime),

    #[error("{regime} regime slab {index} has a lower rate than the slab below it")]
    DecreasingRate { regime: Regime, index: usize },

    #[error("surcharge band {index} overlaps or precedes the previous band")]
    OverlappingSurchargeBands { index: usize },

    /// A percentage value is outside 0..=100.
    #[error("{name} must be between 0 and 100, got {value}")]
    InvalidPercentage { name: &'static str, value: Decimal },

    /// A fractional factor is outside 0..=1.
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidFraction { name: &'static str, value: Decimal },

    #[error("{name} must be non-negative, got {value}")]
    NegativeAmount { name: &'static str, value: Decimal },

    #[error("default exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),
}

impl From<toml::de::Error> for TaxRulesError {
    fn from(err: toml::de::Error) -> Self {
        TaxRulesError::Parse(err.to_string())
    }
}

/// Old-regime parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldRegimeRules {
    pub slabs: Vec<TaxSlab>,
    pub standard_deduction: Decimal,
}

/// New-regime parameters, including the Section 87A rebate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegimeRules {
    pub slabs: Vec<TaxSlab>,
    pub standard_deduction: Decimal,

    /// Taxable income at or below which the rebate applies.
    pub rebate_limit: Decimal,

    /// Flat rebate subtracted from slab tax.
    pub rebate_amount: Decimal,
}

/// Statutory caps on old-regime deductions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLimits {
    pub section_80c: Decimal,

    /// Health insurance for self and family. Used by input validation only;
    /// the engine takes the 80D figure as supplied.
    pub section_80d_self_family: Decimal,

    /// Health insurance for parents. Informational.
    pub section_80d_parents: Decimal,

    /// Home-loan interest.
    pub section_24b: Decimal,
}

/// HRA exemption factors, expressed as fractions of basic salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HraRules {
    pub metro_percentage: Decimal,
    pub non_metro_percentage: Decimal,

    /// Share of basic salary subtracted from rent paid.
    pub rent_basic_percentage: Decimal,
}

/// Defaults applied to RSU inputs the caller leaves unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsuDefaults {
    /// USD to INR.
    pub exchange_rate: Decimal,

    /// Foreign withholding, percent.
    pub withholding_rate: Decimal,
}

/// The complete rule set for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRules {
    pub fiscal_year: FiscalYear,
    pub old_regime: OldRegimeRules,
    pub new_regime: NewRegimeRules,
    pub surcharge_bands: Vec<SurchargeBand>,

    /// Health and education cess, percent of tax plus surcharge.
    pub cess_rate: Decimal,

    pub deduction_limits: DeductionLimits,
    pub hra: HraRules,

    /// Employee provident fund contribution as a fraction of basic salary.
    pub provident_fund_rate: Decimal,

    pub rsu: RsuDefaults,
}

impl TaxRules {
    /// The FY 2025-26 rule table.
    ///
    /// Slab minima carry the one-rupee offset of the published tables
    /// (250001, 500001, ...); the slab taxer measures each slab as
    /// `upper - min`.
    pub fn fy_2025_26() -> Self {
        let rupees = |amount: i64| Decimal::from(amount);
        let percent = |rate: i64| Decimal::from(rate);

        Self {
            fiscal_year: FiscalYear(2025),
            old_regime: OldRegimeRules {
                slabs: vec![
                    TaxSlab::new(rupees(0), Some(rupees(250_000)), percent(0)),
                    TaxSlab::new(rupees(250_001), Some(rupees(500_000)), percent(5)),
                    TaxSlab::new(rupees(500_001), Some(rupees(1_000_000)), percent(20)),
                    TaxSlab::new(rupees(1_000_001), None, percent(30)),
                ],
                standard_deduction: rupees(50_000),
            },
            new_regime: NewRegimeRules {
                slabs: vec![
                    TaxSlab::new(rupees(0), Some(rupees(400_000)), percent(0)),
                    TaxSlab::new(rupees(400_001), Some(rupees(800_000)), percent(5)),
                    TaxSlab::new(rupees(800_001), Some(rupees(1_200_000)), percent(10)),
                    TaxSlab::new(rupees(1_200_001), Some(rupees(1_600_000)), percent(15)),
                    TaxSlab::new(rupees(1_600_001), Some(rupees(2_000_000)), percent(20)),
                    TaxSlab::new(rupees(2_000_001), Some(rupees(2_400_000)), percent(25)),
                    TaxSlab::new(rupees(2_400_001), None, percent(30)),
                ],
                standard_deduction: rupees(75_000),
                rebate_limit: rupees(1_200_000),
                rebate_amount: rupees(25_000),
            },
            surcharge_bands: vec![
                SurchargeBand::new(rupees(5_000_000), Some(rupees(10_000_000)), percent(10)),
                SurchargeBand::new(rupees(10_000_001), Some(rupees(20_000_000)), percent(15)),
                SurchargeBand::new(rupees(20_000_001), Some(rupees(50_000_000)), percent(25)),
                SurchargeBand::new(rupees(50_000_001), None, percent(37)),
            ],
            cess_rate: percent(4),
            deduction_limits: DeductionLimits {
                section_80c: rupees(150_000),
                section_80d_self_family: rupees(25_000),
                section_80d_parents: rupees(50_000),
                section_24b: rupees(200_000),
            },
            hra: HraRules {
                metro_percentage: Decimal::new(50, 2),
                non_metro_percentage: Decimal::new(40, 2),
                rent_basic_percentage: Decimal::new(10, 2),
            },
            provident_fund_rate: Decimal::new(12, 2),
            rsu: RsuDefaults {
                exchange_rate: Decimal::new(8300, 2),
                withholding_rate: percent(22),
            },
        }
    }

    /// Parses and validates a TOML rule document.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRulesError::Parse`] for malformed TOML or missing keys,
    /// and any [`validate`](Self::validate) error for inconsistent tables.
    pub fn from_toml_str(document: &str) -> Result<Self, TaxRulesError> {
        let rules: TaxRules = toml::from_str(document)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Serializes the rule set to TOML, the inverse of
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn to_toml_string(&self) -> Result<String, TaxRulesError> {
        toml::to_string_pretty(self).map_err(|e| TaxRulesError::Parse(e.to_string()))
    }

    /// Slabs of the given regime.
    pub fn slabs(
        &self,
        regime: Regime,
    ) -> &[TaxSlab] {
        match regime {
            Regime::Old => &self.old_regime.slabs,
            Regime::New => &self.new_regime.slabs,
        }
    }

    /// Standard deduction of the given regime.
    pub fn standard_deduction(
        &self,
        regime: Regime,
    ) -> Decimal {
        match regime {
            Regime::Old => self.old_regime.standard_deduction,
            Regime::New => self.new_regime.standard_deduction,
        }
    }

    /// Validates the rule set.
    ///
    /// The slab taxer itself trusts its input; this is where malformed
    /// tables are caught, typically right after loading.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaxRulesError`] found:
    /// - slab tables that are empty, do not start at zero, have gaps,
    ///   inverted bounds, an unbounded slab before the end, a bounded top
    ///   slab, or decreasing rates
    /// - overlapping surcharge bands
    /// - rates outside 0..=100 or fractions outside 0..=1
    /// - negative amounts or a non-positive default exchange rate
    pub fn validate(&self) -> Result<(), TaxRulesError> {
        validate_slabs(Regime::Old, &self.old_regime.slabs)?;
        validate_slabs(Regime::New, &self.new_regime.slabs)?;
        validate_surcharge_bands(&self.surcharge_bands)?;

        validate_percentage("cess_rate", self.cess_rate)?;
        validate_percentage("rsu.withholding_rate", self.rsu.withholding_rate)?;

        validate_fraction("hra.metro_percentage", self.hra.metro_percentage)?;
        validate_fraction("hra.non_metro_percentage", self.hra.non_metro_percentage)?;
        validate_fraction("hra.rent_basic_percentage", self.hra.rent_basic_percentage)?;
        validate_fraction("provident_fund_rate", self.provident_fund_rate)?;

        for (name, value) in [
            ("old_regime.standard_deduction", self.old_regime.standard_deduction),
            ("new_regime.standard_deduction", self.new_regime.standard_deduction),
            ("new_regime.rebate_limit", self.new_regime.rebate_limit),
            ("new_regime.rebate_amount", self.new_regime.rebate_amount),
            ("deduction_limits.section_80c", self.deduction_limits.section_80c),
            (
                "deduction_limits.section_80d_self_family",
                self.deduction_limits.section_80d_self_family,
            ),
            (
                "deduction_limits.section_80d_parents",
                self.deduction_limits.section_80d_parents,
            ),
            ("deduction_limits.section_24b", self.deduction_limits.section_24b),
        ] {
            if value < Decimal::ZERO {
                return Err(TaxRulesError::NegativeAmount { name, value });
            }
        }

        if self.rsu.exchange_rate <= Decimal::ZERO {
            return Err(TaxRulesError::InvalidExchangeRate(self.rsu.exchange_rate));
        }

        Ok(())
    }
}

impl Default for TaxRules {
    fn default() -> Self {
        Self::fy_2025_26()
    }
}

fn validate_slabs(
    regime: Regime,
    slabs: &[TaxSlab],
) -> Result<(), TaxRulesError> {
    let first = slabs.first().ok_or(TaxRulesError::EmptySlabs(regime))?;
    if !first.min.is_zero() {
        return Err(TaxRulesError::SlabsNotFromZero(regime));
    }

    let last_index = slabs.len() - 1;
    for (index, slab) in slabs.iter().enumerate() {
        validate_percentage("slab rate", slab.rate)?;

        match slab.max {
            Some(max) if max < slab.min => {
                return Err(TaxRulesError::InvertedSlab { regime, index });
            }
            None if index != last_index => {
                return Err(TaxRulesError::UnboundedSlabNotLast { regime, index });
            }
            Some(_) if index == last_index => {
                return Err(TaxRulesError::BoundedTopSlab(regime));
            }
            _ => {}
        }

        if index > 0 {
            let previous = &slabs[index - 1];
            let step = previous.max.map(|max| slab.min - max);
            if step != Some(Decimal::ZERO) && step != Some(Decimal::ONE) {
                return Err(TaxRulesError::SlabGap { regime, index });
            }
            if slab.rate < previous.rate {
                return Err(TaxRulesError::DecreasingRate { regime, index });
            }
        }
    }

    Ok(())
}

fn validate_surcharge_bands(bands: &[SurchargeBand]) -> Result<(), TaxRulesError> {
    for (index, band) in bands.iter().enumerate() {
        validate_percentage("surcharge rate", band.rate)?;

        if index > 0 {
            let previous = &bands[index - 1];
            let ordered = previous.max.is_some_and(|max| band.min > max);
            if !ordered {
                return Err(TaxRulesError::OverlappingSurchargeBands { index });
            }
        }
    }

    Ok(())
}

fn validate_percentage(
    name: &'static str,
    value: Decimal,
) -> Result<(), TaxRulesError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(TaxRulesError::InvalidPercentage { name, value });
    }
    Ok(())
}

fn validate_fraction(
    name: &'static str,
    value: Decimal,
) -> Result<(), TaxRulesError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(TaxRulesError::InvalidFraction { name, value });
    }
    Ok(())
}
