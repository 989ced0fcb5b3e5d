use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{FiscalMonth, TaxRules};

/// Currency in which RSU share prices are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RsuCurrency {
    #[default]
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
}

impl RsuCurrency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Some(Self::Inr),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }
}

impl fmt::Display for RsuCurrency {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annual salary, deduction and RSU figures for one taxpayer.
///
/// Every field has a default (zero amounts, no payout months, INR, and the
/// FY 2025-26 RSU exchange and withholding rates), so a document only needs
/// the fields it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryInput {
    // Salary components
    pub basic_salary: Decimal,
    pub hra: Decimal,
    pub special_allowance: Decimal,
    pub lta: Decimal,
    pub medical_allowance: Decimal,
    pub other_allowances: Decimal,
    pub perquisites: Decimal,

    // HRA exemption inputs
    pub rent_paid: Decimal,
    pub is_metro_city: bool,

    // Old-regime deductions
    pub section_80c: Decimal,
    pub section_80d: Decimal,
    pub section_24b: Decimal,
    pub other_deductions: Decimal,

    // RSU grants
    pub rsu_shares_per_quarter: Decimal,
    pub rsu_price_per_share: Decimal,
    pub rsu_currency: RsuCurrency,
    /// USD to INR; ignored for INR grants.
    pub rsu_exchange_rate: Decimal,
    /// Foreign withholding, percent.
    pub rsu_withholding_rate: Decimal,
    /// Months in which a quarterly RSU tranche pays out.
    pub rsu_quarterly_months: BTreeSet<FiscalMonth>,
}

impl Default for SalaryInput {
    fn default() -> Self {
        Self::with_rule_defaults(&TaxRules::fy_2025_26())
    }
}

impl SalaryInput {
    /// An empty input whose RSU exchange and withholding rates come from
    /// `rules` rather than the built-in table.
    pub fn with_rule_defaults(rules: &TaxRules) -> Self {
        Self {
            basic_salary: Decimal::ZERO,
            hra: Decimal::ZERO,
            special_allowance: Decimal::ZERO,
            lta: Decimal::ZERO,
            medical_allowance: Decimal::ZERO,
            other_allowances: Decimal::ZERO,
            perquisites: Decimal::ZERO,
            rent_paid: Decimal::ZERO,
            is_metro_city: false,
            section_80c: Decimal::ZERO,
            section_80d: Decimal::ZERO,
            section_24b: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            rsu_shares_per_quarter: Decimal::ZERO,
            rsu_price_per_share: Decimal::ZERO,
            rsu_currency: RsuCurrency::Inr,
            rsu_exchange_rate: rules.rsu.exchange_rate,
            rsu_withholding_rate: rules.rsu.withholding_rate,
            rsu_quarterly_months: BTreeSet::new(),
        }
    }

    /// Sum of the cash salary components (everything except RSU).
    pub fn salary_components_total(&self) -> Decimal {
        self.basic_salary
            + self.hra
            + self.special_allowance
            + self.lta
            + self.medical_allowance
            + self.other_allowances
            + self.perquisites
    }

    /// Allowances paid alongside basic and HRA: special, LTA, medical,
    /// other allowances and perquisites.
    pub fn allowances_total(&self) -> Decimal {
        self.special_allowance
            + self.lta
            + self.medical_allowance
            + self.other_allowances
            + self.perquisites
    }

    /// Returns a copy with negative amounts clamped to zero and the
    /// withholding rate clamped to 0..=100.
    ///
    /// The calculators assume non-negative input; this is the boundary
    /// normalization callers run first.
    pub fn normalized(&self) -> Self {
        let mut input = self.clone();

        for (field, value) in [
            ("basic_salary", &mut input.basic_salary),
            ("hra", &mut input.hra),
            ("special_allowance", &mut input.special_allowance),
            ("lta", &mut input.lta),
            ("medical_allowance", &mut input.medical_allowance),
            ("other_allowances", &mut input.other_allowances),
            ("perquisites", &mut input.perquisites),
            ("rent_paid", &mut input.rent_paid),
            ("section_80c", &mut input.section_80c),
            ("section_80d", &mut input.section_80d),
            ("section_24b", &mut input.section_24b),
            ("other_deductions", &mut input.other_deductions),
            ("rsu_shares_per_quarter", &mut input.rsu_shares_per_quarter),
            ("rsu_price_per_share", &mut input.rsu_price_per_share),
            ("rsu_exchange_rate", &mut input.rsu_exchange_rate),
            ("rsu_withholding_rate", &mut input.rsu_withholding_rate),
        ] {
            if *value < Decimal::ZERO {
                warn!(field, %value, "negative input clamped to zero");
                *value = Decimal::ZERO;
            }
        }

        if input.rsu_withholding_rate > Decimal::ONE_HUNDRED {
            warn!(value = %input.rsu_withholding_rate, "withholding rate clamped to 100%");
            input.rsu_withholding_rate = Decimal::ONE_HUNDRED;
        }

        input
    }
}
