//! DDT CLI - project insect generation dates from degree-days.

use clap::Parser;
use log::LevelFilter;

#[derive(Parser)]
#[command(
    name = "ddt",
    version,
    about = "Degree-day generation projection toolkit"
)]
struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short = 'q', long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: ddt_cmd::Command,
}

fn level_filter(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let index = (3 + verbose as i32 - quiet as i32).clamp(0, LEVELS.len() as i32 - 1);
    LEVELS[index as usize]
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(level_filter(cli.verbose, cli.quiet))
        .parse_default_env()
        .init();
    ddt_cmd::run(cli.command)
}
