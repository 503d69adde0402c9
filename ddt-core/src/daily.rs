use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Min/max temperatures for one calendar day.
///
/// `normal_count == 0` marks a day taken from the station record (directly or
/// via interpolation); a positive value marks a projected day built from that
/// many years of normal temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub count: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub filled: bool,
    pub normal_count: u32,
}

impl DailyRecord {
    /// An observed day with both temperatures present.
    pub fn observed(date: NaiveDate, count: u32, min: f64, max: f64) -> Self {
        DailyRecord {
            date,
            count,
            min: Some(min),
            max: Some(max),
            filled: false,
            normal_count: 0,
        }
    }

    /// A day with no usable temperatures.
    pub fn missing(date: NaiveDate) -> Self {
        DailyRecord {
            date,
            count: 0,
            min: None,
            max: None,
            filled: false,
            normal_count: 0,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.min.is_none() || self.max.is_none()
    }

    pub fn is_projected(&self) -> bool {
        self.normal_count > 0
    }

    /// Measured at the station and not reconstructed by interpolation.
    pub fn is_direct_observation(&self) -> bool {
        !self.filled && !self.is_projected()
    }

    /// Both temperatures, when present.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.min.zip(self.max)
    }
}

/// Date-ordered daily records with at most one record per date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries(pub Vec<DailyRecord>);

impl DailySeries {
    pub fn records(&self) -> &[DailyRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.0.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.0.last().map(|r| r.date)
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.0.binary_search_by_key(&date, |r| r.date).ok()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.position(date).map(|i| &self.0[i])
    }

    /// Records from `start` (inclusive) to the end of the series.
    pub fn since(&self, start: NaiveDate) -> &[DailyRecord] {
        let i = self.0.partition_point(|r| r.date < start);
        &self.0[i..]
    }

    pub fn missing_dates(&self) -> Vec<NaiveDate> {
        self.0
            .iter()
            .filter(|r| r.is_missing())
            .map(|r| r.date)
            .collect()
    }

    /// Dates increase by exactly one day from record to record.
    pub fn is_contiguous(&self) -> bool {
        self.0
            .windows(2)
            .all(|w| w[0].date.succ_opt() == Some(w[1].date))
    }

    /// Last day measured at the station (neither interpolated nor projected).
    pub fn last_direct_observation(&self) -> Option<NaiveDate> {
        self.0
            .iter()
            .rev()
            .find(|r| r.is_direct_observation())
            .map(|r| r.date)
    }

    pub fn first_projected(&self) -> Option<NaiveDate> {
        self.0.iter().find(|r| r.is_projected()).map(|r| r.date)
    }

    /// Build a series from unordered records. Later duplicates of a date
    /// replace earlier ones.
    pub fn from_unsorted(mut records: Vec<DailyRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        let mut deduped: Vec<DailyRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(last) if last.date == record.date => *last = record,
                _ => deduped.push(record),
            }
        }
        DailySeries(deduped)
    }
}

impl From<Vec<DailyRecord>> for DailySeries {
    fn from(value: Vec<DailyRecord>) -> Self {
        DailySeries::from_unsorted(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DailyRecord, DailySeries};
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, m, day).unwrap()
    }

    #[test]
    fn test_from_unsorted_dedups_and_sorts() {
        let series = DailySeries::from_unsorted(vec![
            DailyRecord::observed(d(1, 3), 24, 40.0, 60.0),
            DailyRecord::observed(d(1, 1), 24, 41.0, 61.0),
            DailyRecord::missing(d(1, 2)),
            DailyRecord::observed(d(1, 1), 12, 42.0, 62.0),
        ]);
        assert_eq!(series.len(), 3);
        assert!(series.is_contiguous());
        assert_eq!(series.get(d(1, 1)).unwrap().min, Some(42.0));
        assert_eq!(series.missing_dates(), vec![d(1, 2)]);
    }

    #[test]
    fn test_lookup_and_since() {
        let series = DailySeries(vec![
            DailyRecord::observed(d(3, 1), 1, 1.0, 2.0),
            DailyRecord::observed(d(3, 2), 1, 1.0, 2.0),
            DailyRecord::observed(d(3, 4), 1, 1.0, 2.0),
        ]);
        assert!(!series.is_contiguous());
        assert_eq!(series.position(d(3, 4)), Some(2));
        assert!(series.get(d(3, 3)).is_none());
        assert_eq!(series.since(d(3, 3)).len(), 1);
        assert_eq!(series.since(d(2, 1)).len(), 3);
    }

    #[test]
    fn test_observation_kinds() {
        let mut filled = DailyRecord::observed(d(5, 1), 0, 50.0, 70.0);
        filled.filled = true;
        let mut projected = DailyRecord::observed(d(5, 2), 0, 50.0, 70.0);
        projected.normal_count = 6;
        let series = DailySeries(vec![
            DailyRecord::observed(d(4, 30), 24, 50.0, 70.0),
            filled,
            projected,
        ]);
        assert_eq!(series.last_direct_observation(), Some(d(4, 30)));
        assert_eq!(series.first_projected(), Some(d(5, 2)));
        assert!(!projected.is_direct_observation());
    }
}
