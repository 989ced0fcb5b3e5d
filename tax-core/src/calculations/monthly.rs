//! Twelve-month cash-flow projection, April through March.
//!
//! Salary components, provident fund and each regime's total tax are spread
//! evenly across the year. RSU tranches land whole in their payout months.
//! Running totals accumulate unrounded values; every emitted figure is
//! rounded to rupees.
//!
//! With four payout months selected the March cumulative gross equals the
//! annual gross salary and the monthly net RSU amounts sum to the annual net
//! RSU. With fewer months the projection carries fewer tranches than the
//! annual figures, which always count four.

use std::array;

use rust_decimal::Decimal;

use crate::calculations::common::round_rupee;
use crate::calculations::regimes::{NewRegime, OldRegime, RegimeCalculator};
use crate::calculations::rsu::rsu_details;
use crate::models::{FiscalMonth, MonthlyRecord, RsuDetail, SalaryInput, TaxRules};

/// Months in a fiscal year.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Builds the monthly projection for one input.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyBreakdownBuilder<'a> {
    rules: &'a TaxRules,
}

/// Evenly spread per-month amounts, unrounded.
#[derive(Debug, Clone, Copy)]
struct MonthlyShares {
    basic: Decimal,
    hra: Decimal,
    allowances: Decimal,
    provident_fund: Decimal,
    tax_old: Decimal,
    tax_new: Decimal,
}

#[derive(Debug, Default)]
struct RsuRunningTotals {
    gross: Decimal,
    withheld: Decimal,
    net: Decimal,
}

impl<'a> MonthlyBreakdownBuilder<'a> {
    pub fn new(rules: &'a TaxRules) -> Self {
        Self { rules }
    }

    /// Projects the input across the fiscal year.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::MonthlyBreakdownBuilder;
    /// use tax_core::{FiscalMonth, SalaryInput, TaxRules};
    ///
    /// let rules = TaxRules::fy_2025_26();
    /// let input = SalaryInput { basic_salary: dec!(600000), ..Default::default() };
    ///
    /// let months = MonthlyBreakdownBuilder::new(&rules).build(&input);
    ///
    /// assert_eq!(months[0].month, FiscalMonth::April);
    /// assert_eq!(months[0].basic, dec!(50000));
    /// assert_eq!(months[11].cumulative_basic, dec!(600000));
    /// ```
    pub fn build(
        &self,
        input: &SalaryInput,
    ) -> [MonthlyRecord; 12] {
        let rsu = rsu_details(input);
        let old_total = OldRegime::new(self.rules).calculate_with_rsu(input, &rsu).total_tax;
        let new_total = NewRegime::new(self.rules).calculate_with_rsu(input, &rsu).total_tax;

        self.build_with(input, &rsu, old_total, new_total)
    }

    /// [`build`](Self::build) with the RSU grant and both regimes' total tax
    /// already computed.
    pub fn build_with(
        &self,
        input: &SalaryInput,
        rsu: &RsuDetail,
        old_total_tax: Decimal,
        new_total_tax: Decimal,
    ) -> [MonthlyRecord; 12] {
        let shares = MonthlyShares {
            basic: input.basic_salary / MONTHS_PER_YEAR,
            hra: input.hra / MONTHS_PER_YEAR,
            allowances: input.allowances_total() / MONTHS_PER_YEAR,
            provident_fund: input.basic_salary * self.rules.provident_fund_rate / MONTHS_PER_YEAR,
            tax_old: old_total_tax / MONTHS_PER_YEAR,
            tax_new: new_total_tax / MONTHS_PER_YEAR,
        };

        let mut running = RsuRunningTotals::default();

        array::from_fn(|index| {
            let month = FiscalMonth::ALL[index];
            self.month_record(month, input, rsu, &shares, &mut running)
        })
    }

    fn month_record(
        &self,
        month: FiscalMonth,
        input: &SalaryInput,
        rsu: &RsuDetail,
        shares: &MonthlyShares,
        running: &mut RsuRunningTotals,
    ) -> MonthlyRecord {
        let has_rsu_payout = input.rsu_quarterly_months.contains(&month);
        let (gross_rsu, withheld, net_rsu) = if has_rsu_payout {
            (rsu.gross_rsu_per_quarter, rsu.us_tax_withheld_per_quarter, rsu.net_rsu_per_quarter)
        } else {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        };

        running.gross += gross_rsu;
        running.withheld += withheld;
        running.net += net_rsu;

        let elapsed = Decimal::from(month.number());
        let gross_salary = shares.basic + shares.hra + shares.allowances + net_rsu;
        let cumulative_gross_salary =
            (shares.basic + shares.hra + shares.allowances) * elapsed + running.net;

        MonthlyRecord {
            month,
            month_number: month.number(),
            period_start: self.rules.fiscal_year.month_start(month),

            basic: round_rupee(shares.basic),
            hra: round_rupee(shares.hra),
            allowances: round_rupee(shares.allowances),
            gross_salary: round_rupee(gross_salary),

            has_rsu_payout,
            gross_rsu: round_rupee(gross_rsu),
            us_tax_withheld: round_rupee(withheld),
            net_rsu: round_rupee(net_rsu),

            provident_fund: round_rupee(shares.provident_fund),
            income_tax_old: round_rupee(shares.tax_old),
            income_tax_new: round_rupee(shares.tax_new),

            cumulative_basic: round_rupee(shares.basic * elapsed),
            cumulative_hra: round_rupee(shares.hra * elapsed),
            cumulative_allowances: round_rupee(shares.allowances * elapsed),
            cumulative_gross_salary: round_rupee(cumulative_gross_salary),
            cumulative_provident_fund: round_rupee(shares.provident_fund * elapsed),
            cumulative_tax_old: round_rupee(shares.tax_old * elapsed),
            cumulative_tax_new: round_rupee(shares.tax_new * elapsed),
            cumulative_gross_rsu: round_rupee(running.gross),
            cumulative_us_tax_withheld: round_rupee(running.withheld),
            cumulative_net_rsu: round_rupee(running.net),

            net_salary_old: round_rupee(gross_salary - shares.tax_old - shares.provident_fund),
            net_salary_new: round_rupee(gross_salary - shares.tax_new - shares.provident_fund),
        }
    }
}
