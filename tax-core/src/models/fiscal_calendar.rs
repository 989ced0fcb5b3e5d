use std::fmt;

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};

/// A month of the Indian fiscal year, declared in fiscal order (April first),
/// so the derived `Ord` sorts April before March.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FiscalMonth {
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
    January,
    February,
    March,
}

impl FiscalMonth {
    /// All twelve months in fiscal order.
    pub const ALL: [FiscalMonth; 12] = [
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
        Self::January,
        Self::February,
        Self::March,
    ];

    /// 1-based position within the fiscal year (April = 1, March = 12).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
        }
    }

    /// Parses a month name. Accepts full names and three-letter
    /// abbreviations, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_ascii_lowercase();
        if needle.len() < 3 {
            return None;
        }
        Self::ALL.into_iter().find(|month| {
            let name = month.name().to_ascii_lowercase();
            name == needle || (needle.len() == 3 && name.starts_with(&needle))
        })
    }

    pub fn calendar_month(self) -> Month {
        match self {
            Self::April => Month::April,
            Self::May => Month::May,
            Self::June => Month::June,
            Self::July => Month::July,
            Self::August => Month::August,
            Self::September => Month::September,
            Self::October => Month::October,
            Self::November => Month::November,
            Self::December => Month::December,
            Self::January => Month::January,
            Self::February => Month::February,
            Self::March => Month::March,
        }
    }

    /// January to March fall in the second calendar year of a fiscal year.
    pub fn in_second_calendar_year(self) -> bool {
        matches!(self, Self::January | Self::February | Self::March)
    }
}

impl fmt::Display for FiscalMonth {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An Indian fiscal year, identified by the calendar year in which it starts
/// (`FiscalYear(2025)` is FY 2025-26, running 1 April 2025 to 31 March 2026).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    pub fn start_year(self) -> i32 {
        self.0
    }

    /// Display label in the "2025-26" form.
    pub fn label(self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }

    /// Parses either a bare start year ("2025") or a label ("2025-26").
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (start, Some(end)),
            None => (s, None),
        };
        let start: i32 = start.parse().ok()?;
        if let Some(end) = end {
            let end: i32 = end.parse().ok()?;
            if end != (start + 1).rem_euclid(100) && end != start + 1 {
                return None;
            }
        }
        Some(Self(start))
    }

    /// First calendar day of `month` within this fiscal year.
    ///
    /// Returns `None` only for years outside chrono's supported range.
    pub fn month_start(
        self,
        month: FiscalMonth,
    ) -> Option<NaiveDate> {
        let year = if month.in_second_calendar_year() {
            self.0 + 1
        } else {
            self.0
        };
        NaiveDate::from_ymd_opt(year, month.calendar_month().number_from_month(), 1)
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "FY {}", self.label())
    }
}
