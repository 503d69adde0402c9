//! Shared utility functions for DDT crates.

/// Date utility functions
pub mod dates {
    use anyhow::anyhow;
    use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

    /// Date formats accepted in temperature files, tried in order.
    pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

    /// Time formats accepted in temperature files, tried in order.
    pub const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%H%M"];

    /// Parse a date cell in any of [`DATE_FORMATS`].
    pub fn parse_date_flexible(s: &str) -> anyhow::Result<NaiveDate> {
        let s = s.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .ok_or_else(|| anyhow!("unrecognized date '{s}'"))
    }

    /// Parse a time cell in any of [`TIME_FORMATS`].
    pub fn parse_time_flexible(s: &str) -> anyhow::Result<NaiveTime> {
        let s = s.trim();
        TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
            .ok_or_else(|| anyhow!("unrecognized time '{s}'"))
    }

    /// Parse a cell holding a date and optionally a time separated by a space
    /// or `T`. A bare date is taken as midnight.
    pub fn parse_datetime_flexible(s: &str) -> anyhow::Result<NaiveDateTime> {
        let s = s.trim();
        match s.split_once([' ', 'T']) {
            Some((date, time)) => {
                Ok(parse_date_flexible(date)?.and_time(parse_time_flexible(time)?))
            }
            None => Ok(parse_date_flexible(s)?.and_time(NaiveTime::MIN)),
        }
    }

    /// Shift a date by whole calendar years, clamping Feb 29 to Feb 28 in
    /// non-leap target years. Returns `None` outside chrono's range.
    pub fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
        let months = Months::new(years.unsigned_abs().checked_mul(12)?);
        if years >= 0 {
            date.checked_add_months(months)
        } else {
            date.checked_sub_months(months)
        }
    }

    /// The same month and day in another year, or `None` when that day does
    /// not exist there (Feb 29 in a non-leap year).
    pub fn same_day_in_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
        date.with_year(year)
    }

}
