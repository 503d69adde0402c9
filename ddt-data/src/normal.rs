//! Normal (climatological) temperatures and series projection.
//!
//! The normal is computed per calendar day over a trailing window of the
//! gap-filled history. Feb 29 never takes part: leap days are dropped from the
//! history before grouping and are never generated when projecting.

use chrono::{Datelike, NaiveDate};
use ddt_core::{
    config::NormMethod,
    daily::{DailyRecord, DailySeries},
    diagnostic::{Diagnostic, Diagnostics},
    error::{DdError, Result},
    month_day::{MonthDay, DAYS_PER_NORMAL_YEAR},
};
use ddt_utils::dates::add_years;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normal min/max for one calendar day and the number of years behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalDay {
    pub month_day: MonthDay,
    pub min: f64,
    pub max: f64,
    pub count: u32,
}

/// Date span of history used for the normal, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NormalWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One [`NormalDay`] for each of the 365 calendar days, in calendar order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalProfile(pub Vec<NormalDay>);

/// Trailing window of at most `max_years` years ending at the last date of
/// the series; 0 means the whole series. A window reaching before the first
/// date is clipped and reported.
pub fn normal_window(
    series: &DailySeries,
    max_years: u32,
    diagnostics: &mut Diagnostics,
) -> Result<NormalWindow> {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Err(DdError::InsufficientData);
    };
    if max_years == 0 {
        return Ok(NormalWindow { start: first, end: last });
    }
    let requested = i32::try_from(max_years)
        .ok()
        .and_then(|years| add_years(last, -years))
        .and_then(|d| d.succ_opt());
    let start = match requested {
        Some(start) if start >= first => start,
        _ => {
            diagnostics.push(Diagnostic::NormalWindowClipped {
                requested_years: max_years,
                requested_start: requested.unwrap_or(first),
                used_start: first,
            });
            first
        }
    };
    Ok(NormalWindow { start, end: last })
}

fn central_value(values: &mut [f64], method: NormMethod) -> f64 {
    match method {
        NormMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
        NormMethod::Median => {
            values.sort_by(|a, b| a.total_cmp(b));
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        }
    }
}

impl NormalProfile {
    /// Compute the normal from the gap-filled history.
    pub fn estimate(
        series: &DailySeries,
        max_years: u32,
        method: NormMethod,
        diagnostics: &mut Diagnostics,
    ) -> Result<(NormalProfile, NormalWindow)> {
        let window = normal_window(series, max_years, diagnostics)?;
        info!(
            "Computing normal ({}) using data from {} to {}",
            method, window.start, window.end
        );

        let mut buckets: BTreeMap<MonthDay, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for record in series.since(window.start) {
            let Some(month_day) = MonthDay::from_date(record.date) else {
                continue;
            };
            let bucket = buckets.entry(month_day).or_default();
            if let Some(min) = record.min {
                bucket.0.push(min);
            }
            if let Some(max) = record.max {
                bucket.1.push(max);
            }
        }

        let days: Vec<NormalDay> = buckets
            .into_iter()
            .filter(|(_, (mins, maxs))| !mins.is_empty() && !maxs.is_empty())
            .map(|(month_day, (mut mins, mut maxs))| NormalDay {
                month_day,
                count: mins.len() as u32,
                min: central_value(&mut mins, method),
                max: central_value(&mut maxs, method),
            })
            .collect();

        if days.len() < DAYS_PER_NORMAL_YEAR {
            let uncovered: Vec<String> = MonthDay::all()
                .filter(|md| days.binary_search_by_key(md, |d| d.month_day).is_err())
                .map(|md| md.to_string())
                .collect();
            debug!("No history for {}", uncovered.join(", "));
            return Err(DdError::IncompleteNormal {
                missing: DAYS_PER_NORMAL_YEAR - days.len(),
            });
        }
        debug!(
            "Normal uses between {} and {} years per day",
            days.iter().map(|d| d.count).min().unwrap_or_default(),
            days.iter().map(|d| d.count).max().unwrap_or_default()
        );
        Ok((NormalProfile(days), window))
    }

    pub fn days(&self) -> &[NormalDay] {
        &self.0
    }

    pub fn get(&self, month_day: MonthDay) -> Option<&NormalDay> {
        self.0.get(month_day.index()).filter(|d| d.month_day == month_day)
    }

    /// Projected days laid over whole calendar years, from the year of
    /// `last` through `years` years later, keeping only dates after `last`
    /// and no later than `years` years beyond it.
    pub fn project_after(&self, last: NaiveDate, years: u32) -> Vec<DailyRecord> {
        let Some(horizon) = add_years(last, years as i32) else {
            return Vec::new();
        };
        let first_year = last.year();
        let mut projected = Vec::new();
        for year in first_year..=first_year + years as i32 {
            for normal in &self.0 {
                let Some(date) = normal.month_day.in_year(year) else {
                    continue;
                };
                if date <= last || date > horizon {
                    continue;
                }
                projected.push(DailyRecord {
                    date,
                    count: 0,
                    min: Some(normal.min),
                    max: Some(normal.max),
                    filled: false,
                    normal_count: normal.count,
                });
            }
        }
        projected
    }

    /// Append projected normal days to the end of the history.
    pub fn extend(&self, history: &DailySeries, years: u32) -> DailySeries {
        let Some(last) = history.last_date() else {
            return history.clone();
        };
        let projected = self.project_after(last, years);
        if let (Some(first), Some(final_day)) = (projected.first(), projected.last()) {
            info!(
                "Projecting {} days of normal temperatures from {} to {}",
                projected.len(),
                first.date,
                final_day.date
            );
        }
        let mut records = history.0.clone();
        records.extend(projected);
        DailySeries(records)
    }
}
