//! The `project` command.

use crate::{
    load::{open_input, read_daily, read_readings},
    output::{format_text_summary, write_series_csv, write_summary_json},
    settings::{FileSettings, InputColumns, InputSettings, ModelArgs},
};
use anyhow::Context;
use ddt_core::config::ProjectionConfig;
use ddt_model::pipeline::{self, ProjectionRun};
use log::info;
use std::{
    fs::File,
    io::{BufRead, BufWriter},
    path::Path,
};

/// Resolve settings, run the projection on the temperatures file and write
/// the requested outputs. The text summary always goes to stdout.
pub fn run_project(
    cfg_file: Option<&Path>,
    input: InputSettings,
    model: ModelArgs,
    series_csv: Option<&Path>,
    summary_json: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = FileSettings::resolve(cfg_file, input, model)?;
    let config = ProjectionConfig::try_from(settings.model.clone())?;
    info!("{:?}", config);

    let path = settings.input.require_temperatures_file()?;
    let run = project_reader(
        open_input(path)?,
        &settings.input.columns(),
        settings.input.station_filter(),
        &config,
    )?;

    if let Some(out) = series_csv {
        let file = File::create(out)
            .with_context(|| format!("Failed to create '{}'", out.display()))?;
        write_series_csv(BufWriter::new(file), &run)?;
        info!("Series written to {}", out.display());
    }
    if let Some(out) = summary_json {
        let file = File::create(out)
            .with_context(|| format!("Failed to create '{}'", out.display()))?;
        write_summary_json(BufWriter::new(file), &run)?;
        info!("Summary written to {}", out.display());
    }
    print!("{}", format_text_summary(&run));
    Ok(())
}

/// Load temperatures in either layout and run the model on them.
pub fn project_reader<R: BufRead>(
    reader: R,
    columns: &InputColumns,
    station: Option<&str>,
    config: &ProjectionConfig,
) -> anyhow::Result<ProjectionRun> {
    let run = if columns.daily_columns()?.is_some() {
        let daily = read_daily(reader, columns, station)?;
        pipeline::run_daily(config, daily)?
    } else {
        let readings = read_readings(reader, columns, station)?;
        pipeline::run(config, &readings)?
    };
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use ddt_core::{date_range::DateRange, error::DdError};
    use std::{f64::consts::TAU, fmt::Write, io::Cursor};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mean_temp(date: NaiveDate) -> f64 {
        55.0 - 20.0 * (date.ordinal0() as f64 / 365.0 * TAU).cos()
    }

    fn readings_csv(start: NaiveDate, end: NaiveDate) -> String {
        let mut csv = String::from("STATION,DATE,TIME,TEMP_A_F\n");
        for date in DateRange::inclusive(start, end) {
            for (time, offset) in [("03:00", -9.0), ("09:00", 2.0), ("15:00", 9.5), ("21:00", -1.0)] {
                let _ = writeln!(csv, "Orchard,{},{},{:.1}", date, time, mean_temp(date) + offset);
            }
        }
        csv
    }

    fn daily_csv(start: NaiveDate, end: NaiveDate) -> String {
        let mut csv = String::from("DATE,MIN,MAX\n");
        for date in DateRange::inclusive(start, end) {
            let _ = writeln!(csv, "{},{:.1},{:.1}", date, mean_temp(date) - 9.0, mean_temp(date) + 9.5);
        }
        csv
    }

    #[test]
    fn test_project_from_readings() {
        let data = readings_csv(ymd(2015, 1, 1), ymd(2018, 5, 31));
        let config = ProjectionConfig::with_start_date(ymd(2018, 4, 1));
        let run = project_reader(
            Cursor::new(data),
            &InputColumns::default(),
            Some("Orchard"),
            &config,
        )
        .unwrap();
        assert_eq!(run.latest_date, ymd(2018, 5, 31));
        assert_eq!(run.current.len(), 3);
        assert_eq!(run.history.len(), 3);
        assert!(run.daily.records().iter().all(|r| r.count == 4));
    }

    #[test]
    fn test_project_from_daily_extremes() {
        let data = daily_csv(ymd(2015, 1, 1), ymd(2018, 5, 31));
        let columns = InputColumns {
            min_air_temp: Some("MIN".to_string()),
            max_air_temp: Some("MAX".to_string()),
            ..Default::default()
        };
        let config = ProjectionConfig::with_start_date(ymd(2018, 4, 1));
        let run = project_reader(Cursor::new(data), &columns, None, &config).unwrap();
        assert_eq!(run.earliest_date, ymd(2015, 1, 1));
        assert_eq!(run.current.len(), 3);
    }

    #[test]
    fn test_readings_and_daily_layouts_agree() {
        let config = ProjectionConfig::with_start_date(ymd(2018, 4, 1));
        let from_readings = project_reader(
            Cursor::new(readings_csv(ymd(2015, 1, 1), ymd(2018, 5, 31))),
            &InputColumns::default(),
            None,
            &config,
        )
        .unwrap();
        let columns = InputColumns {
            min_air_temp: Some("MIN".to_string()),
            max_air_temp: Some("MAX".to_string()),
            ..Default::default()
        };
        let from_daily = project_reader(
            Cursor::new(daily_csv(ymd(2015, 1, 1), ymd(2018, 5, 31))),
            &columns,
            None,
            &config,
        )
        .unwrap();
        assert_eq!(from_readings.current, from_daily.current);
    }

    #[test]
    fn test_unknown_station_is_empty_input() {
        let data = readings_csv(ymd(2018, 1, 1), ymd(2018, 1, 10));
        let config = ProjectionConfig::with_start_date(ymd(2018, 1, 2));
        let err = project_reader(
            Cursor::new(data),
            &InputColumns::default(),
            Some("Elsewhere"),
            &config,
        )
        .unwrap_err();
        assert_eq!(err.downcast_ref::<DdError>(), Some(&DdError::EmptyInput));
    }
}
