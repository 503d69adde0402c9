use chrono::NaiveDate;

/// Iterator over every calendar day from a start date through an end date
/// (inclusive). Yields nothing when the end precedes the start.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRange {
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            next: (start <= end).then_some(start),
            end,
        }
    }

    /// Number of days remaining in the range.
    pub fn num_days(&self) -> usize {
        match self.next {
            Some(next) => ((self.end - next).num_days() + 1) as usize,
            None => 0,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.succ_opt().filter(|d| *d <= self.end);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.num_days();
        (n, Some(n))
    }
}

impl ExactSizeIterator for DateRange {}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_date_range_iteration() {
        let start = NaiveDate::from_ymd_opt(2020, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
        let range = DateRange::inclusive(start, end);
        assert_eq!(range.len(), 5);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(dates[4], end);
    }

    #[test]
    fn test_date_range_single_day() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let dates: Vec<NaiveDate> = DateRange::inclusive(start, start).collect();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_date_range_empty() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        let range = DateRange::inclusive(start, end);
        assert_eq!(range.num_days(), 0);
        assert_eq!(range.count(), 0);
    }
}
