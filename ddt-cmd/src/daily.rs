//! The `daily` command: raw readings to one min/max row per day.

use crate::{
    load::{open_input, read_readings},
    output::write_daily_csv,
    settings::{FileSettings, InputColumns, InputSettings, ModelArgs},
};
use anyhow::Context;
use ddt_core::{config::DEFAULT_MIN_READINGS_PER_DAY, daily::DailySeries};
use ddt_data::aggregate::aggregate_readings;
use log::info;
use std::{
    fs::File,
    io::{self, BufRead, BufWriter},
    path::Path,
};

pub fn run_daily_conversion(
    cfg_file: Option<&Path>,
    input: InputSettings,
    min_readings_per_day: Option<u32>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let model = ModelArgs {
        min_readings_per_day,
        ..Default::default()
    };
    let settings = FileSettings::resolve(cfg_file, input, model)?;
    let min_readings = settings
        .model
        .min_readings_per_day
        .unwrap_or(DEFAULT_MIN_READINGS_PER_DAY);

    let path = settings.input.require_temperatures_file()?;
    let series = readings_to_daily(
        open_input(path)?,
        &settings.input.columns(),
        settings.input.station_filter(),
        min_readings,
    )?;

    match output {
        Some(out) => {
            let file = File::create(out)
                .with_context(|| format!("Failed to create '{}'", out.display()))?;
            write_daily_csv(BufWriter::new(file), &series)?;
            info!("{} days written to {}", series.len(), out.display());
        }
        None => write_daily_csv(io::stdout().lock(), &series)?,
    }
    Ok(())
}

/// Aggregate a readings file to daily extremes. Days with too few readings
/// are kept with empty min/max.
pub fn readings_to_daily<R: BufRead>(
    reader: R,
    columns: &InputColumns,
    station: Option<&str>,
    min_readings_per_day: u32,
) -> anyhow::Result<DailySeries> {
    let readings = read_readings(reader, columns, station)?;
    Ok(aggregate_readings(&readings, min_readings_per_day)?)
}
