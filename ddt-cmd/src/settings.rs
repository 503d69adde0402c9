//! Run settings from a TOML file and the command line.
//!
//! A settings file holds the model parameters (see
//! [`RawProjectionConfig`]) next to the keys describing the temperatures
//! file. Command-line flags override whatever the file sets.
//!
//! ```toml
//! temperatures_file = "temps.csv.gz"
//! station = "Country Club"
//! start_date = "2018-01-01"
//! DD_per_gen = 622
//! norm_method = "median"
//! air_temp_col = "TEMP_A_F"
//! ```

use anyhow::Context;
use clap::Args;
use ddt_core::config::{NormMethod, RawProjectionConfig};
use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATION_COL: &str = "STATION";
pub const DEFAULT_DATE_COL: &str = "DATE";
pub const DEFAULT_TIME_COL: &str = "TIME";
pub const DEFAULT_AIR_TEMP_COL: &str = "TEMP_A_F";

const KNOWN_KEYS: [&str; 19] = [
    "temperatures_file",
    "station",
    "skiprows",
    "station_col",
    "date_col",
    "time_col",
    "air_temp_col",
    "min_air_temp_col",
    "max_air_temp_col",
    "base_temp",
    "DD_per_gen",
    "num_gen",
    "min_readings_per_day",
    "min_points_per_day",
    "max_num_years_to_norm",
    "norm_method",
    "num_years_to_add_for_projection",
    "interpolation_window",
    "start_date",
];

/// Where the temperatures come from and how the file is laid out.
#[derive(Args, Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputSettings {
    /// Temperature file (CSV; `.gz` files are decompressed)
    #[arg(short = 'f', long)]
    pub temperatures_file: Option<PathBuf>,

    /// Keep only rows for this station (all rows when unset)
    #[arg(short = 's', long)]
    pub station: Option<String>,

    /// Lines to skip before the header row
    #[arg(long)]
    pub skiprows: Option<usize>,

    /// Header of the station column
    #[arg(long)]
    pub station_col: Option<String>,

    /// Header of the date column
    #[arg(long)]
    pub date_col: Option<String>,

    /// Header of the time column
    #[arg(long)]
    pub time_col: Option<String>,

    /// Header of the air temperature column
    #[arg(long)]
    pub air_temp_col: Option<String>,

    /// Header of the daily minimum column; with --max-air-temp-col the file
    /// is read as one row per day
    #[arg(long)]
    pub min_air_temp_col: Option<String>,

    /// Header of the daily maximum column
    #[arg(long)]
    pub max_air_temp_col: Option<String>,
}

/// Column layout of a temperatures file, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputColumns {
    pub skiprows: usize,
    pub station: String,
    pub date: String,
    pub time: String,
    pub air_temp: String,
    pub min_air_temp: Option<String>,
    pub max_air_temp: Option<String>,
}

impl Default for InputColumns {
    fn default() -> Self {
        InputColumns {
            skiprows: 0,
            station: DEFAULT_STATION_COL.to_string(),
            date: DEFAULT_DATE_COL.to_string(),
            time: DEFAULT_TIME_COL.to_string(),
            air_temp: DEFAULT_AIR_TEMP_COL.to_string(),
            min_air_temp: None,
            max_air_temp: None,
        }
    }
}

impl InputColumns {
    /// Min and max column names when the file holds daily extremes.
    pub fn daily_columns(&self) -> anyhow::Result<Option<(&str, &str)>> {
        match (&self.min_air_temp, &self.max_air_temp) {
            (Some(min), Some(max)) => Ok(Some((min.as_str(), max.as_str()))),
            (None, None) => Ok(None),
            _ => anyhow::bail!("min_air_temp_col and max_air_temp_col must be set together"),
        }
    }
}

impl InputSettings {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: InputSettings) -> InputSettings {
        InputSettings {
            temperatures_file: other.temperatures_file.or(self.temperatures_file),
            station: other.station.or(self.station),
            skiprows: other.skiprows.or(self.skiprows),
            station_col: other.station_col.or(self.station_col),
            date_col: other.date_col.or(self.date_col),
            time_col: other.time_col.or(self.time_col),
            air_temp_col: other.air_temp_col.or(self.air_temp_col),
            min_air_temp_col: other.min_air_temp_col.or(self.min_air_temp_col),
            max_air_temp_col: other.max_air_temp_col.or(self.max_air_temp_col),
        }
    }

    pub fn columns(&self) -> InputColumns {
        let defaults = InputColumns::default();
        InputColumns {
            skiprows: self.skiprows.unwrap_or(defaults.skiprows),
            station: self.station_col.clone().unwrap_or(defaults.station),
            date: self.date_col.clone().unwrap_or(defaults.date),
            time: self.time_col.clone().unwrap_or(defaults.time),
            air_temp: self.air_temp_col.clone().unwrap_or(defaults.air_temp),
            min_air_temp: self.min_air_temp_col.clone(),
            max_air_temp: self.max_air_temp_col.clone(),
        }
    }

    /// The station to keep, or `None` to keep every row.
    pub fn station_filter(&self) -> Option<&str> {
        self.station
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn require_temperatures_file(&self) -> anyhow::Result<&Path> {
        self.temperatures_file
            .as_deref()
            .context("No temperatures file given (use -f or set temperatures_file)")
    }
}

/// Model parameters as command-line flags.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ModelArgs {
    /// Date (YYYY-MM-DD) to begin the degree-day accumulation
    #[arg(long)]
    pub start_date: Option<String>,

    /// Base temperature threshold for the degree-day computation
    #[arg(long)]
    pub base_temp: Option<f64>,

    /// Degree-days required for one generation of development
    #[arg(long = "DD-per-gen", alias = "dd-per-gen")]
    pub dd_per_gen: Option<f64>,

    /// Number of generations to project
    #[arg(long)]
    pub num_gen: Option<u32>,

    /// Days with fewer readings have no min/max
    #[arg(long, alias = "min-points-per-day")]
    pub min_readings_per_day: Option<u32>,

    /// Years of history for the normal temperatures (0 uses all)
    #[arg(long)]
    pub max_num_years_to_norm: Option<u32>,

    /// Normal temperature statistic
    #[arg(long)]
    pub norm_method: Option<NormMethod>,

    /// Years of normal temperatures appended for projection
    #[arg(long)]
    pub num_years_to_add_for_projection: Option<u32>,

    /// Rolling window used when interpolating missing days
    #[arg(long)]
    pub interpolation_window: Option<u32>,
}

impl From<ModelArgs> for RawProjectionConfig {
    fn from(args: ModelArgs) -> Self {
        RawProjectionConfig {
            base_temp: args.base_temp,
            dd_per_gen: args.dd_per_gen,
            num_gen: args.num_gen,
            min_readings_per_day: args.min_readings_per_day,
            max_num_years_to_norm: args.max_num_years_to_norm,
            norm_method: args.norm_method.map(|m| m.to_string()),
            num_years_to_add_for_projection: args.num_years_to_add_for_projection,
            interpolation_window: args.interpolation_window,
            start_date: args.start_date,
        }
    }
}

/// Everything a settings file may hold.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileSettings {
    #[serde(flatten)]
    pub input: InputSettings,
    #[serde(flatten)]
    pub model: RawProjectionConfig,
}

impl FileSettings {
    /// Parse settings from TOML text. Unknown keys are reported and ignored.
    pub fn parse(text: &str) -> anyhow::Result<FileSettings> {
        let parsed: toml::Table = toml::from_str(text)?;
        let mut table = toml::Table::new();
        for (key, value) in parsed {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown setting '{key}'");
                continue;
            }
            let key = if key == "min_points_per_day" {
                "min_readings_per_day".to_string()
            } else {
                key
            };
            // an unquoted TOML date is as good as a string
            let value = match value {
                toml::Value::Datetime(dt) if key == "start_date" => toml::Value::String(dt.to_string()),
                value => value,
            };
            table.insert(key, value);
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    pub fn load(path: &Path) -> anyhow::Result<FileSettings> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings = FileSettings::parse(&text)
            .with_context(|| format!("Invalid settings file '{}'", path.display()))?;
        info!("Using settings file '{}'", path.display());
        Ok(settings)
    }

    /// Settings file (when given) overridden by flags.
    pub fn resolve(
        path: Option<&Path>,
        input: InputSettings,
        model: ModelArgs,
    ) -> anyhow::Result<FileSettings> {
        let base = match path {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        Ok(FileSettings {
            input: base.input.merge(input),
            model: base.model.merge(model.into()),
        })
    }
}
