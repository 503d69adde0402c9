use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-leap year used to anchor month/day arithmetic.
const REFERENCE_YEAR: i32 = 2001;

/// Number of calendar days in a year once Feb 29 is removed.
pub const DAYS_PER_NORMAL_YEAR: usize = 365;

/// A calendar day without a year. Feb 29 is not representable, so every
/// `MonthDay` exists in every year.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<MonthDay> {
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day).map(|_| MonthDay { month, day })
    }

    /// The month/day of a date, or `None` for Feb 29.
    pub fn from_date(date: NaiveDate) -> Option<MonthDay> {
        if is_leap_day(date) {
            return None;
        }
        Some(MonthDay {
            month: date.month(),
            day: date.day(),
        })
    }

    /// Place this month/day in the given year.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }

    /// Zero-based position within a 365-day year (Jan 1 = 0, Dec 31 = 364).
    pub fn index(&self) -> usize {
        self.in_year(REFERENCE_YEAR)
            .map(|d| d.ordinal0() as usize)
            .unwrap_or_default()
    }

    /// Inverse of [`MonthDay::index`].
    pub fn from_index(index: usize) -> Option<MonthDay> {
        if index >= DAYS_PER_NORMAL_YEAR {
            return None;
        }
        NaiveDate::from_yo_opt(REFERENCE_YEAR, index as u32 + 1).and_then(MonthDay::from_date)
    }

    /// All 365 month/days in calendar order.
    pub fn all() -> impl Iterator<Item = MonthDay> {
        (0..DAYS_PER_NORMAL_YEAR).filter_map(MonthDay::from_index)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl TryFrom<NaiveDate> for MonthDay {
    type Error = NaiveDate;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        MonthDay::from_date(value).ok_or(value)
    }
}

pub fn is_leap_day(date: NaiveDate) -> bool {
    matches!((date.month(), date.day()), (2, 29))
}
