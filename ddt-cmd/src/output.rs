//! Run outputs: the daily series CSV, the JSON summary and the console
//! summary.

use chrono::NaiveDate;
use ddt_core::{
    config::ProjectionConfig,
    daily::DailySeries,
    diagnostic::Diagnostic,
};
use ddt_data::normal::NormalWindow;
use ddt_model::{
    generation::{GenerationMilestone, MilestoneStatus},
    pipeline::ProjectionRun,
};
use serde::Serialize;
use std::{fmt::Write as _, io::Write};

/// One row of the extended series joined with its degree-days.
#[derive(Debug, Serialize)]
struct SeriesRow {
    date: NaiveDate,
    count: u32,
    min: Option<f64>,
    max: Option<f64>,
    filled: bool,
    normal_count: u32,
    dd: Option<f64>,
    cumulative_dd: Option<f64>,
}

/// One row of a readings-to-daily conversion.
#[derive(Debug, Serialize)]
struct DailyRow {
    date: NaiveDate,
    count: u32,
    min: Option<f64>,
    max: Option<f64>,
}

/// Write `date,count,min,max,filled,normal_count,dd,cumulative_dd` for every
/// day of the extended series.
pub fn write_series_csv<W: Write>(writer: W, run: &ProjectionRun) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (record, acc) in run
        .extended
        .records()
        .iter()
        .zip(run.accumulation.records())
    {
        wtr.serialize(SeriesRow {
            date: record.date,
            count: record.count,
            min: record.min,
            max: record.max,
            filled: record.filled,
            normal_count: record.normal_count,
            dd: acc.degree_days,
            cumulative_dd: acc.cumulative,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `date,count,min,max` for every day of a daily series.
pub fn write_daily_csv<W: Write>(writer: W, series: &DailySeries) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in series.records() {
        wtr.serialize(DailyRow {
            date: record.date,
            count: record.count,
            min: record.min,
            max: record.max,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct Metadata {
    earliest_date: NaiveDate,
    latest_date: NaiveDate,
    last_observed: Option<NaiveDate>,
    first_projected: Option<NaiveDate>,
    normal_window: NormalWindow,
}

#[derive(Debug, Serialize)]
struct MilestoneReport {
    generation: u32,
    date: NaiveDate,
    elapsed_days: i64,
    threshold: f64,
    status: MilestoneStatus,
}

#[derive(Debug, Serialize)]
struct SeasonReport {
    year: i32,
    start: NaiveDate,
    in_normal_window: bool,
    milestones: Vec<MilestoneReport>,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    config: &'a ProjectionConfig,
    metadata: Metadata,
    milestones: Vec<MilestoneReport>,
    history: Vec<SeasonReport>,
    diagnostics: &'a [Diagnostic],
}

fn milestone_reports(run: &ProjectionRun, milestones: &[GenerationMilestone]) -> Vec<MilestoneReport> {
    milestones
        .iter()
        .map(|m| MilestoneReport {
            generation: m.generation,
            date: m.date,
            elapsed_days: m.elapsed_days,
            threshold: m.threshold,
            status: run.status(m),
        })
        .collect()
}

fn summary(run: &ProjectionRun) -> Summary<'_> {
    Summary {
        config: &run.config,
        metadata: Metadata {
            earliest_date: run.earliest_date,
            latest_date: run.latest_date,
            last_observed: run.last_observed,
            first_projected: run.first_projected,
            normal_window: run.normal_window,
        },
        milestones: milestone_reports(run, &run.current),
        history: run
            .history
            .iter()
            .map(|season| SeasonReport {
                year: season.year,
                start: season.start,
                in_normal_window: season.in_normal_window,
                milestones: milestone_reports(run, &season.milestones),
            })
            .collect(),
        diagnostics: &run.diagnostics.0,
    }
}

pub fn write_summary_json<W: Write>(writer: W, run: &ProjectionRun) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, &summary(run))?;
    Ok(())
}

/// Plain-text generation dates for the console.
pub fn format_text_summary(run: &ProjectionRun) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Temperatures: {} to {} (last observed {})",
        run.earliest_date,
        run.latest_date,
        run.last_observed
            .map_or_else(|| "none".to_string(), |d| d.to_string())
    );
    let _ = writeln!(
        out,
        "Normal ({}): {} to {}",
        run.config.norm_method, run.normal_window.start, run.normal_window.end
    );
    if let Some(first) = run.first_projected {
        let _ = writeln!(out, "Projection from: {first}");
    }
    let _ = writeln!(
        out,
        "\nGenerations from {} ({} DD each above {}):",
        run.config.start_date, run.config.dd_per_gen, run.config.base_temp
    );
    for m in &run.current {
        let status = match run.status(m) {
            MilestoneStatus::Passed => "passed",
            MilestoneStatus::Projected => "projected",
        };
        let _ = writeln!(
            out,
            "  F{}  {}  {:>4} days  {}",
            m.generation, m.date, m.elapsed_days, status
        );
    }
    if !run.history.is_empty() {
        let _ = writeln!(out, "\nPrevious years:");
        for season in &run.history {
            let dates: Vec<String> = season
                .milestones
                .iter()
                .map(|m| format!("{} ({}d)", m.date, m.elapsed_days))
                .collect();
            let marker = if season.in_normal_window { "*" } else { " " };
            let _ = writeln!(out, "  {}{}  {}", season.year, marker, dates.join("  "));
        }
        let _ = writeln!(out, "  (* start date within the normal window)");
    }
    if !run.diagnostics.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for diagnostic in run.diagnostics.iter() {
            let _ = writeln!(out, "  {diagnostic}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration};
    use ddt_core::daily::DailyRecord;
    use ddt_model::pipeline::run_daily;
    use std::f64::consts::TAU;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_run() -> ProjectionRun {
        let start = ymd(2015, 1, 1);
        let series = DailySeries(
            (0..(3 * 365 + 120))
                .map(|i| {
                    let date = start + Duration::days(i);
                    let mean = 55.0 - 20.0 * (date.ordinal0() as f64 / 365.0 * TAU).cos();
                    DailyRecord::observed(date, 24, mean - 10.0, mean + 10.0)
                })
                .collect(),
        );
        let config = ProjectionConfig::with_start_date(ymd(2018, 3, 1));
        run_daily(&config, series).unwrap()
    }

    #[test]
    fn test_series_csv_layout() {
        let run = sample_run();
        let mut buf = Vec::new();
        write_series_csv(&mut buf, &run).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,count,min,max,filled,normal_count,dd,cumulative_dd")
        );
        assert!(lines.next().unwrap().starts_with("2015-01-01,24,"));
        assert_eq!(text.lines().count(), run.extended.len() + 1);
    }

    #[test]
    fn test_daily_csv_missing_values_blank() {
        let series = DailySeries(vec![
            DailyRecord::observed(ymd(2018, 5, 1), 6, 44.5, 70.0),
            DailyRecord::missing(ymd(2018, 5, 2)),
        ]);
        let mut buf = Vec::new();
        write_daily_csv(&mut buf, &series).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,count,min,max\n2018-05-01,6,44.5,70.0\n2018-05-02,0,,\n"
        );
    }

    #[test]
    fn test_summary_json() {
        let run = sample_run();
        let mut buf = Vec::new();
        write_summary_json(&mut buf, &run).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["config"]["DD_per_gen"], 622.0);
        assert_eq!(value["config"]["norm_method"], "median");
        assert_eq!(value["metadata"]["earliest_date"], "2015-01-01");
        assert_eq!(value["milestones"].as_array().unwrap().len(), 3);
        assert_eq!(value["milestones"][0]["generation"], 1);
        assert!(value["history"].as_array().unwrap().len() == 3);
        assert_eq!(
            value["diagnostics"][0]["kind"],
            "normal_window_clipped"
        );
    }

    #[test]
    fn test_text_summary() {
        let run = sample_run();
        let text = format_text_summary(&run);
        assert!(text.contains("Generations from 2018-03-01"));
        assert!(text.contains("  F1  "));
        assert!(text.contains("  F3  "));
        assert!(text.contains("Previous years:"));
        assert!(text.contains("Warnings:"));
    }
}
