//! Gap filling for daily min/max series.
//!
//! Missing days are filled either by straight linear interpolation or, with a
//! window larger than one, by interpolating a centered rolling mean so the
//! values on each side of a gap are smoothed before the gap is bridged.

use chrono::NaiveDate;
use ddt_core::{
    daily::{DailyRecord, DailySeries},
    date_range::DateRange,
    error::{DdError, Result},
};
use log::{debug, info};

/// Linearly interpolate the interior gaps of a column. Leading and trailing
/// gaps are left as `None`.
pub fn interpolate_linear(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let mut previous: Option<(usize, f64)> = None;
    for (i, value) in values.iter().enumerate() {
        let Some(value) = *value else { continue };
        if let Some((start, start_value)) = previous {
            let steps = i - start;
            if steps > 1 {
                let slope = (value - start_value) / steps as f64;
                for (offset, slot) in result[start + 1..i].iter_mut().enumerate() {
                    *slot = Some(start_value + slope * (offset + 1) as f64);
                }
            }
        }
        previous = Some((i, value));
    }
    result
}

/// Centered rolling mean of `window` points. A position whose window runs off
/// either end of the column or contains a gap has no value.
pub fn rolling_mean_centered(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let offset = (window - 1) / 2;
    (0..values.len())
        .map(|i| {
            let end = i + 1 + offset;
            let start = end.checked_sub(window)?;
            if end > values.len() {
                return None;
            }
            let sum = values[start..end]
                .iter()
                .copied()
                .try_fold(0.0, |acc, v| v.map(|v| acc + v))?;
            Some(sum / window as f64)
        })
        .collect()
}

/// Fill leading and trailing gaps with the nearest available value.
pub fn extend_edges(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let first = values.iter().position(Option::is_some);
    let last = values.iter().rposition(Option::is_some);
    if let (Some(first), Some(last)) = (first, last) {
        let head = values[first];
        let tail = values[last];
        result[..first].iter_mut().for_each(|v| *v = head);
        result[last + 1..].iter_mut().for_each(|v| *v = tail);
    }
    result
}

/// Carry the last value forward over a trailing gap.
fn fill_trailing(mut values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    if let Some(last) = values.iter().rposition(Option::is_some) {
        let tail = values[last];
        values[last + 1..].iter_mut().for_each(|v| *v = tail);
    }
    values
}

/// Fill one column of a contiguous series. `missing` flags the rows whose
/// values are to be replaced by the smoothed estimate.
fn fill_column(values: &[Option<f64>], missing: &[bool], window: usize) -> Vec<Option<f64>> {
    let filled = if window <= 1 {
        interpolate_linear(values)
    } else {
        let smoothed = fill_trailing(interpolate_linear(&rolling_mean_centered(values, window)));
        let substituted: Vec<Option<f64>> = values
            .iter()
            .zip(smoothed)
            .zip(missing)
            .map(|((value, smooth), is_missing)| if *is_missing { smooth } else { *value })
            .collect();
        interpolate_linear(&substituted)
    };
    extend_edges(&filled)
}

/// Reindex a series so every date between its first and last record is present.
fn reindex_daily(series: &DailySeries) -> Vec<DailyRecord> {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Vec::new();
    };
    DateRange::inclusive(first, last)
        .map(|date| {
            series
                .get(date)
                .copied()
                .unwrap_or_else(|| DailyRecord::missing(date))
        })
        .collect()
}

/// Fill every missing min/max in a daily series.
///
/// Days that were missing (or absent) are marked `filled` and have their
/// reading count set to 0; all other days keep their values and are marked
/// not filled. Gaps at the very start or end of the series that cannot be
/// interpolated take the nearest available value.
pub fn fill_gaps(series: &DailySeries, interpolation_window: u32) -> Result<DailySeries> {
    let records = reindex_daily(series);
    if records.iter().all(DailyRecord::is_missing) {
        return Err(DdError::InsufficientData);
    }

    let missing: Vec<bool> = records.iter().map(DailyRecord::is_missing).collect();
    let window = interpolation_window as usize;
    let mins = fill_column(&records.iter().map(|r| r.min).collect::<Vec<_>>(), &missing, window);
    let maxs = fill_column(&records.iter().map(|r| r.max).collect::<Vec<_>>(), &missing, window);

    let filled_dates: Vec<NaiveDate> = records
        .iter()
        .zip(&missing)
        .filter(|(_, m)| **m)
        .map(|(r, _)| r.date)
        .collect();
    debug!("Filled days: {:?}", filled_dates);

    let mut out = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let (Some(min), Some(max)) = (mins[i], maxs[i]) else {
            return Err(DdError::InsufficientData);
        };
        out.push(DailyRecord {
            date: record.date,
            count: if missing[i] { 0 } else { record.count },
            min: Some(min),
            max: Some(max),
            filled: missing[i],
            normal_count: 0,
        });
    }
    info!(
        "Gap filling (window {}): {} of {} days interpolated",
        interpolation_window,
        filled_dates.len(),
        out.len()
    );
    Ok(DailySeries(out))
}
