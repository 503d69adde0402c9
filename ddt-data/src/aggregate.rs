//! Reduce individual readings to one min/max row per calendar day.

use chrono::NaiveDate;
use ddt_core::{
    daily::{DailyRecord, DailySeries},
    date_range::DateRange,
    error::{DdError, Result},
    reading::Reading,
};
use log::{debug, info};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct DayExtremes {
    count: u32,
    min: f64,
    max: f64,
}

impl DayExtremes {
    fn empty() -> Self {
        DayExtremes {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Aggregate readings into a contiguous daily series spanning the first to
/// the last reading date.
///
/// Days with fewer than `min_readings_per_day` readings keep no min/max and
/// have their count reset to 0, the same as days with no readings at all.
/// Non-finite temperature values are ignored.
pub fn aggregate_readings(readings: &[Reading], min_readings_per_day: u32) -> Result<DailySeries> {
    if readings.is_empty() {
        return Err(DdError::EmptyInput);
    }

    let mut days: BTreeMap<NaiveDate, DayExtremes> = BTreeMap::new();
    for reading in readings {
        let day = days.entry(reading.date()).or_insert_with(DayExtremes::empty);
        if reading.value.is_finite() {
            day.add(reading.value);
        }
    }

    let (first, last) = match (days.keys().next(), days.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(DdError::EmptyInput),
    };

    let mut excluded = 0usize;
    let records: Vec<DailyRecord> = DateRange::inclusive(first, last)
        .map(|date| match days.get(&date) {
            Some(day) if day.count > 0 && day.count >= min_readings_per_day => {
                DailyRecord::observed(date, day.count, day.min, day.max)
            }
            Some(day) => {
                debug!("{date}: {} readings, below minimum of {min_readings_per_day}", day.count);
                excluded += 1;
                DailyRecord::missing(date)
            }
            None => DailyRecord::missing(date),
        })
        .collect();

    let series = DailySeries(records);
    info!(
        "Total days: {} ({} to {}), missing days: {} ({} under {} readings)",
        series.len(),
        first,
        last,
        series.missing_dates().len(),
        excluded,
        min_readings_per_day
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::aggregate_readings;
    use ddt_core::{error::DdError, reading::Reading};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn hourly(day: u32, hours: u32, base: f64) -> Vec<Reading> {
        (0..hours)
            .map(|h| Reading::new(at(day, h), base + h as f64))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate_readings(&[], 4), Err(DdError::EmptyInput));
    }

    #[test]
    fn test_min_max_and_count() {
        let readings = hourly(1, 24, 40.0);
        let series = aggregate_readings(&readings, 4).unwrap();
        assert_eq!(series.len(), 1);
        let day = series.records()[0];
        assert_eq!(day.count, 24);
        assert_eq!(day.min, Some(40.0));
        assert_eq!(day.max, Some(63.0));
        assert!(!day.filled);
        assert_eq!(day.normal_count, 0);
    }

    #[test]
    fn test_reindexes_absent_days() {
        let mut readings = hourly(5, 6, 50.0);
        readings.extend(hourly(1, 6, 45.0));
        let series = aggregate_readings(&readings, 4).unwrap();
        assert_eq!(series.len(), 5);
        assert!(series.is_contiguous());
        let missing = series.missing_dates();
        assert_eq!(missing.len(), 3);
        assert!(series.records()[1..4].iter().all(|r| r.count == 0));
    }

    #[test]
    fn test_under_sampled_days_are_excluded() {
        let mut readings = hourly(1, 24, 40.0);
        readings.extend(hourly(2, 3, 41.0));
        readings.extend(hourly(3, 24, 42.0));
        let series = aggregate_readings(&readings, 4).unwrap();
        let day2 = series.records()[1];
        assert_eq!(day2.count, 0);
        assert!(day2.is_missing());
        assert_eq!(series.records()[2].min, Some(42.0));
    }

    #[test]
    fn test_unsorted_and_duplicate_readings() {
        let readings = vec![
            Reading::new(at(2, 5), 61.0),
            Reading::new(at(1, 3), 55.0),
            Reading::new(at(2, 1), 49.0),
            Reading::new(at(1, 3), 55.0),
        ];
        let series = aggregate_readings(&readings, 1).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].count, 2);
        assert_eq!(series.records()[1].min, Some(49.0));
        assert_eq!(series.records()[1].max, Some(61.0));
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let readings = vec![
            Reading::new(at(1, 0), f64::NAN),
            Reading::new(at(1, 1), 50.0),
        ];
        let series = aggregate_readings(&readings, 1).unwrap();
        assert_eq!(series.records()[0].count, 1);
        assert_eq!(series.records()[0].min, Some(50.0));
    }
}
