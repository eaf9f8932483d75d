//! Command-line definition

use std::path::PathBuf;

use barolog_core::sink::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Barometric altitude logger, ground-test front end
#[derive(Parser, Debug)]
#[command(name = "barolog", version, about = "Barometric altitude logger")]
pub struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Calibrate and log a simulated flight
    Simulate(SimulateArgs),
    /// Re-derive altitude from a recorded log
    Replay(ReplayArgs),
    /// Print flight statistics for a log
    Summary(SummaryArgs),
}

/// Flags shared by every command that writes a log
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Log format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Sampling period (ms)
    #[arg(long)]
    pub period_ms: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration_s: Option<u64>,

    /// Sea-level pressure reference (QNH, hPa)
    #[arg(long)]
    pub sea_level_hpa: Option<f64>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Apogee of the simulated flight (m)
    #[arg(long)]
    pub apogee_m: Option<f64>,

    /// Probability that a read fails
    #[arg(long)]
    pub fault_rate: Option<f64>,

    /// Noise generator seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pace the run with the wall clock instead of simulated time
    #[arg(long)]
    pub realtime: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Log to replay (CSV or JSON Lines)
    pub log: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Reuse the baseline recorded in the log instead of recalibrating
    /// from its first rows
    #[arg(long)]
    pub recorded_baseline: bool,

    /// Replay rows logged as sensor faults as clean samples
    #[arg(long)]
    pub ignore_faults: bool,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Log to summarise
    pub log: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Csv,
    Jsonl,
}

impl From<FormatArg> for LogFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => LogFormat::Csv,
            FormatArg::Jsonl => LogFormat::JsonLines,
        }
    }
}
