use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single temperature reading from a logging station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub station_id: Option<String>,
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Reading {
            station_id: None,
            timestamp,
            value,
        }
    }

    pub fn with_station(mut self, station_id: impl Into<String>) -> Self {
        self.station_id = Some(station_id.into());
        self
    }

    /// Calendar day the reading belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl Ord for Reading {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.value.total_cmp(&other.value))
            .then_with(|| self.station_id.cmp(&other.station_id))
    }
}

impl PartialOrd for Reading {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Reading {}

#[cfg(test)]
mod tests {
    use super::Reading;
    use chrono::NaiveDate;
    use std::cmp::Ordering;

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_sort_by_timestamp() {
        let mut readings = vec![
            Reading::new(at(2, 0), 50.0),
            Reading::new(at(1, 12), 70.0),
            Reading::new(at(1, 6), 55.0),
        ];
        readings.sort();
        assert_eq!(readings[0].value, 55.0);
        assert_eq!(readings[2].date(), NaiveDate::from_ymd_opt(2018, 6, 2).unwrap());
    }

    #[test]
    fn test_station_breaks_ties() {
        let a = Reading::new(at(1, 6), 55.0).with_station("A");
        let b = Reading::new(at(1, 6), 55.0).with_station("B");
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(Reading::new(at(1, 6), 55.0).cmp(&a), Ordering::Less);
    }
}
