use chrono::NaiveDate;
use ddt_core::{
    daily::DailySeries,
    diagnostic::{Diagnostic, Diagnostics},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Degree-days for a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyDegreeDays {
    pub value: f64,
    /// Set when `(base - avg) / W` fell outside [-1, 1] and had to be clamped.
    pub clamped_ratio: Option<f64>,
}

/// Baskerville-Ermin single-sine degree-days for one day.
///
/// The day's temperature is modelled as one sine wave between `min` and `max`
/// and the area above `base` is integrated. `avg` defaults to the midpoint of
/// `min` and `max`.
pub fn single_sine(min: f64, max: f64, avg: Option<f64>, base: f64) -> DailyDegreeDays {
    let avg = avg.unwrap_or((min + max) / 2.0);
    if max < base {
        return DailyDegreeDays {
            value: 0.0,
            clamped_ratio: None,
        };
    }
    if min >= base {
        return DailyDegreeDays {
            value: avg - base,
            clamped_ratio: None,
        };
    }
    let w = (max - min) / 2.0;
    let ratio = (base - avg) / w;
    let clamped_ratio = (!(-1.0..=1.0).contains(&ratio)).then_some(ratio);
    let a = ratio.clamp(-1.0, 1.0).asin();
    DailyDegreeDays {
        value: (w * a.cos() - (base - avg) * (FRAC_PI_2 - a)) / PI,
        clamped_ratio,
    }
}

/// Degree-days for one date and the running total since the first date.
/// Both are `None` once any day so far had no temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulationRecord {
    pub date: NaiveDate,
    pub degree_days: Option<f64>,
    pub cumulative: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulationSeries(pub Vec<AccumulationRecord>);

impl AccumulationSeries {
    pub fn records(&self) -> &[AccumulationRecord] {
        &self.0
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.0.binary_search_by_key(&date, |r| r.date).ok()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&AccumulationRecord> {
        self.position(date).map(|i| &self.0[i])
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.0.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.0.last().map(|r| r.date)
    }
}

/// Degree-days for every day of the series and their running sum.
///
/// A day missing min or max has no degree-day value, and every cumulative
/// total from that day on is missing as well.
pub fn accumulate(
    series: &DailySeries,
    base_temp: f64,
    diagnostics: &mut Diagnostics,
) -> AccumulationSeries {
    let mut running = Some(0.0);
    let records = series
        .records()
        .iter()
        .map(|record| {
            let degree_days = record.min_max().map(|(min, max)| {
                let day = single_sine(min, max, None, base_temp);
                if let Some(ratio) = day.clamped_ratio {
                    diagnostics.push(Diagnostic::RatioClamped {
                        date: record.date,
                        ratio,
                    });
                }
                day.value
            });
            running = running.zip(degree_days).map(|(sum, dd)| sum + dd);
            AccumulationRecord {
                date: record.date,
                degree_days,
                cumulative: running,
            }
        })
        .collect();
    AccumulationSeries(records)
}
