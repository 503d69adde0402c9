//! Command implementations for the DDT CLI.
//!
//! Provides subcommands for projecting insect generation dates from a
//! temperature record and for reducing raw readings to daily extremes.

use clap::Subcommand;
use settings::{InputSettings, ModelArgs};
use std::path::PathBuf;

pub mod daily;
pub mod load;
pub mod output;
pub mod project;
pub mod settings;

#[derive(Subcommand)]
pub enum Command {
    /// Project generation dates from a temperature record
    Project {
        /// Settings file (TOML); flags override its values
        cfg_file: Option<PathBuf>,

        #[command(flatten)]
        input: InputSettings,

        #[command(flatten)]
        model: ModelArgs,

        /// Output path for the extended daily series with degree-days (CSV)
        #[arg(short = 'o', long)]
        series_csv: Option<PathBuf>,

        /// Output path for the run summary (JSON)
        #[arg(short = 'j', long)]
        summary_json: Option<PathBuf>,
    },

    /// Convert individual temperature readings to daily min and max values
    Daily {
        /// Settings file (TOML); flags override its values
        cfg_file: Option<PathBuf>,

        #[command(flatten)]
        input: InputSettings,

        /// Days with fewer readings have no min/max
        #[arg(long, alias = "min-points-per-day")]
        min_readings_per_day: Option<u32>,

        /// Output path for the daily CSV (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Project {
            cfg_file,
            input,
            model,
            series_csv,
            summary_json,
        } => project::run_project(
            cfg_file.as_deref(),
            input,
            model,
            series_csv.as_deref(),
            summary_json.as_deref(),
        ),
        Command::Daily {
            cfg_file,
            input,
            min_readings_per_day,
            output,
        } => daily::run_daily_conversion(
            cfg_file.as_deref(),
            input,
            min_readings_per_day,
            output.as_deref(),
        ),
    }
}
