//! Generation dates from a cumulative degree-day series.

use crate::degree_day::AccumulationSeries;
use chrono::{Datelike, NaiveDate};
use ddt_core::{
    diagnostic::{Diagnostic, Diagnostics},
    error::{DdError, Result},
};
use ddt_data::normal::NormalWindow;
use ddt_utils::dates::same_day_in_year;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Whether a generation date lies within the measured record or in the
/// projected future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    Passed,
    Projected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationMilestone {
    pub generation: u32,
    pub date: NaiveDate,
    pub elapsed_days: i64,
    /// Degree-days after the start date that had to be exceeded.
    pub threshold: f64,
}

impl GenerationMilestone {
    pub fn status(&self, last_observed: NaiveDate) -> MilestoneStatus {
        if self.date <= last_observed {
            MilestoneStatus::Passed
        } else {
            MilestoneStatus::Projected
        }
    }
}

/// Generation dates for one season, started on the same calendar day as the
/// current season but in an earlier year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProjection {
    pub year: i32,
    pub start: NaiveDate,
    /// The season's start date lies within the data used for the normal.
    pub in_normal_window: bool,
    pub milestones: Vec<GenerationMilestone>,
}

/// Find the first date after `start` at which the degree-days accumulated
/// since `start` exceed `dd_per_gen * g`, for each generation `g` in
/// `1..=num_gen`. Reaching a threshold exactly does not count as crossing it.
pub fn project_generations(
    accumulation: &AccumulationSeries,
    start: NaiveDate,
    dd_per_gen: f64,
    num_gen: u32,
) -> Result<Vec<GenerationMilestone>> {
    let records = accumulation.records();
    let start_index = accumulation
        .position(start)
        .ok_or(DdError::DateNotFound(start))?;
    let start_total = records[start_index].cumulative;

    let mut milestones = Vec::with_capacity(num_gen as usize);
    let mut cursor = start_index + 1;
    for generation in 1..=num_gen {
        let threshold = dd_per_gen * generation as f64;
        let crossed = records[cursor.min(records.len())..]
            .iter()
            .position(|r| match (r.cumulative, start_total) {
                (Some(total), Some(base)) => total - base > threshold,
                _ => false,
            })
            .map(|offset| cursor + offset);
        let Some(index) = crossed else {
            return Err(DdError::ThresholdNeverReached {
                start,
                generation,
                threshold,
            });
        };
        let date = records[index].date;
        milestones.push(GenerationMilestone {
            generation,
            date,
            elapsed_days: (date - start).num_days(),
            threshold,
        });
        cursor = index;
    }
    debug!("Generations from {start}: {:?}", milestones);
    Ok(milestones)
}

/// Repeat [`project_generations`] from the same calendar day in every year
/// of the series before the start date's year. Years in which that day is
/// not part of the series are skipped and reported.
pub fn project_history(
    accumulation: &AccumulationSeries,
    start: NaiveDate,
    dd_per_gen: f64,
    num_gen: u32,
    normal_window: &NormalWindow,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SeasonProjection>> {
    let Some(first) = accumulation.first_date() else {
        return Ok(Vec::new());
    };
    let mut seasons = Vec::new();
    for year in first.year()..start.year() {
        let season_start = same_day_in_year(start, year).filter(|d| accumulation.get(*d).is_some());
        let Some(season_start) = season_start else {
            diagnostics.push(Diagnostic::SeasonSkipped { year });
            continue;
        };
        let milestones = project_generations(accumulation, season_start, dd_per_gen, num_gen)?;
        seasons.push(SeasonProjection {
            year,
            start: season_start,
            in_normal_window: normal_window.contains(season_start),
            milestones,
        });
    }
    info!(
        "Compared against {} previous seasons starting {:02}-{:02}",
        seasons.len(),
        start.month(),
        start.day()
    );
    Ok(seasons)
}
