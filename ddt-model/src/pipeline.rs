//! End-to-end projection run: readings → daily → gap-filled → extended with
//! normals → degree-days → generation dates.

use crate::{
    degree_day::{accumulate, AccumulationSeries},
    generation::{
        project_generations, project_history, GenerationMilestone, MilestoneStatus,
        SeasonProjection,
    },
};
use chrono::NaiveDate;
use ddt_core::{
    config::ProjectionConfig,
    daily::DailySeries,
    diagnostic::Diagnostics,
    error::{DdError, Result},
    reading::Reading,
};
use ddt_data::{
    aggregate::aggregate_readings,
    interpolation::fill_gaps,
    normal::{NormalProfile, NormalWindow},
};
use log::info;
use serde::Serialize;

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRun {
    pub config: ProjectionConfig,
    /// Gap-filled history.
    pub daily: DailySeries,
    /// History followed by the projected normal days.
    pub extended: DailySeries,
    pub normal: NormalProfile,
    pub normal_window: NormalWindow,
    /// Degree-days over `extended`, aligned record for record.
    pub accumulation: AccumulationSeries,
    pub current: Vec<GenerationMilestone>,
    pub history: Vec<SeasonProjection>,
    pub earliest_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub last_observed: Option<NaiveDate>,
    pub first_projected: Option<NaiveDate>,
    pub diagnostics: Diagnostics,
}

impl ProjectionRun {
    /// Passed when the milestone falls on or before the last measured day.
    pub fn status(&self, milestone: &GenerationMilestone) -> MilestoneStatus {
        match self.last_observed {
            Some(last) => milestone.status(last),
            None => MilestoneStatus::Projected,
        }
    }
}

/// Run the full model on raw per-reading temperatures.
pub fn run(config: &ProjectionConfig, readings: &[Reading]) -> Result<ProjectionRun> {
    config.validate()?;
    let daily = aggregate_readings(readings, config.min_readings_per_day)?;
    run_daily(config, daily)
}

/// Run the model on a series that is already one min/max per day.
pub fn run_daily(config: &ProjectionConfig, daily: DailySeries) -> Result<ProjectionRun> {
    config.validate()?;
    if daily.is_empty() {
        return Err(DdError::EmptyInput);
    }
    let daily = DailySeries::from_unsorted(daily.0);
    let mut diagnostics = Diagnostics::new();

    let history = fill_gaps(&daily, config.interpolation_window)?;
    let (Some(earliest_date), Some(latest_date)) = (history.first_date(), history.last_date())
    else {
        return Err(DdError::InsufficientData);
    };

    let (normal, normal_window) = NormalProfile::estimate(
        &history,
        config.max_num_years_to_norm,
        config.norm_method,
        &mut diagnostics,
    )?;
    let extended = normal.extend(&history, config.num_years_to_add_for_projection);
    let accumulation = accumulate(&extended, config.base_temp, &mut diagnostics);

    let current = project_generations(
        &accumulation,
        config.start_date,
        config.dd_per_gen,
        config.num_gen,
    )?;
    let history_seasons = project_history(
        &accumulation,
        config.start_date,
        config.dd_per_gen,
        config.num_gen,
        &normal_window,
        &mut diagnostics,
    )?;

    let last_observed = history.last_direct_observation();
    let first_projected = extended.first_projected();
    info!(
        "Temperatures from {} to {} (last observed {}), {} generations from {}",
        earliest_date,
        latest_date,
        last_observed.map_or_else(|| "none".to_string(), |d| d.to_string()),
        current.len(),
        config.start_date
    );

    Ok(ProjectionRun {
        config: config.clone(),
        daily: history,
        extended,
        normal,
        normal_window,
        accumulation,
        current,
        history: history_seasons,
        earliest_date,
        latest_date,
        last_observed,
        first_projected,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};
    use ddt_core::{date_range::DateRange, diagnostic::Diagnostic};
    use std::f64::consts::TAU;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Six readings a day following a diurnal swing around a seasonal mean.
    fn readings(start: NaiveDate, end: NaiveDate) -> Vec<Reading> {
        DateRange::inclusive(start, end)
            .flat_map(|date| {
                let seasonal = 55.0 - 20.0 * (date.ordinal0() as f64 / 365.0 * TAU).cos();
                (0..6).map(move |k| {
                    let hour = 4 * k;
                    let diurnal = 10.0 * ((hour as f64 - 9.0) / 24.0 * TAU).sin();
                    Reading::new(date.and_hms_opt(hour, 0, 0).unwrap(), seasonal + diurnal)
                })
            })
            .collect()
    }

    fn config() -> ProjectionConfig {
        ProjectionConfig::with_start_date(ymd(2018, 3, 1))
    }

    #[test]
    fn test_end_to_end() {
        let mut input = readings(ymd(2012, 1, 1), ymd(2018, 6, 30));
        // one day with no readings, one with too few
        input.retain(|r| {
            let d = r.date();
            d != ymd(2016, 7, 10) && !(d == ymd(2016, 7, 11) && r.timestamp.hour() >= 8)
        });

        let run = run(&config(), &input).unwrap();

        assert_eq!(run.earliest_date, ymd(2012, 1, 1));
        assert_eq!(run.latest_date, ymd(2018, 6, 30));
        assert_eq!(run.last_observed, Some(ymd(2018, 6, 30)));
        assert_eq!(run.first_projected, Some(ymd(2018, 7, 1)));
        assert!(run.daily.is_contiguous());
        assert!(run.daily.get(ymd(2016, 7, 10)).unwrap().filled);
        assert!(run.daily.get(ymd(2016, 7, 11)).unwrap().filled);
        assert!(!run.daily.get(ymd(2016, 7, 12)).unwrap().filled);

        assert_eq!(run.extended.last_date(), Some(ymd(2021, 6, 30)));
        assert!(run
            .extended
            .records()
            .iter()
            .filter(|r| r.date > run.latest_date)
            .all(|r| r.normal_count > 0 && !r.filled));
        assert_eq!(run.extended.get(ymd(2020, 2, 29)), None);
        assert_eq!(run.accumulation.records().len(), run.extended.len());

        assert_eq!(run.current.len(), 3);
        assert!(run.current.windows(2).all(|w| w[0].date < w[1].date));
        assert!(run
            .history
            .iter()
            .map(|s| s.year)
            .eq(2012..2018));
        assert_eq!(run.normal_window.start, ymd(2012, 7, 1));
        assert!(run.diagnostics.is_empty());
    }

    #[test]
    fn test_rerun_is_identical() {
        let input = readings(ymd(2014, 1, 1), ymd(2018, 5, 15));
        let first = run(&config(), &input).unwrap();
        let second = run(&config(), &input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_history_clips_normal_window() {
        let input = readings(ymd(2015, 1, 1), ymd(2018, 5, 15));
        let run = run(&config(), &input).unwrap();
        assert_eq!(run.normal_window.start, ymd(2015, 1, 1));
        assert!(run
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::NormalWindowClipped { requested_years: 6, .. })));
    }

    #[test]
    fn test_milestone_status_follows_last_observation() {
        let input = readings(ymd(2014, 1, 1), ymd(2018, 8, 1));
        let run = run(&config(), &input).unwrap();
        let statuses: Vec<_> = run.current.iter().map(|m| run.status(m)).collect();
        for (milestone, status) in run.current.iter().zip(&statuses) {
            let expected = if milestone.date <= ymd(2018, 8, 1) {
                MilestoneStatus::Passed
            } else {
                MilestoneStatus::Projected
            };
            assert_eq!(*status, expected);
        }
    }

    #[test]
    fn test_invalid_config_fails_before_data() {
        let mut config = config();
        config.dd_per_gen = 0.0;
        assert_eq!(run(&config, &[]), Err(DdError::InvalidDegreeDaysPerGeneration(0.0)));
    }

    #[test]
    fn test_empty_readings() {
        assert_eq!(run(&config(), &[]), Err(DdError::EmptyInput));
    }

    #[test]
    fn test_start_date_outside_series() {
        let input = readings(ymd(2014, 1, 1), ymd(2018, 5, 15));
        let config = ProjectionConfig::with_start_date(ymd(2030, 1, 1));
        assert_eq!(
            run(&config, &input),
            Err(DdError::DateNotFound(ymd(2030, 1, 1)))
        );
    }

    #[test]
    fn test_run_daily_without_projection_years() {
        let daily = aggregate_readings(&readings(ymd(2014, 1, 1), ymd(2018, 12, 31)), 4).unwrap();
        let mut config = config();
        config.num_years_to_add_for_projection = 0;
        let run = run_daily(&config, daily).unwrap();
        assert_eq!(run.extended, run.daily);
        assert_eq!(run.first_projected, None);
        assert!(run.current.iter().all(|m| run.status(m) == MilestoneStatus::Passed));
        assert!(run.current[0].date - config.start_date > Duration::days(0));
    }

    #[test]
    fn test_run_daily_sorts_records() {
        let daily = aggregate_readings(&readings(ymd(2014, 1, 1), ymd(2018, 5, 15)), 4).unwrap();
        let expected = run_daily(&config(), daily.clone()).unwrap();

        let mut shuffled = daily.0;
        shuffled.reverse();
        shuffled.swap(10, 500);
        let run = run_daily(&config(), DailySeries(shuffled)).unwrap();
        assert_eq!(run, expected);
        assert!(run.daily.is_contiguous());
    }
}
