//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "thermocast",
    version,
    about = "Temperature sensor dedup, feature building and short-horizon forecasting"
)]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report errors as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG overrides
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a synthetic diurnal readings CSV
    Generate {
        /// Days of history to produce (1..=3660)
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Readings per hour (1..=3600)
        #[arg(long, default_value_t = 12)]
        readings_per_hour: u32,
        /// RNG seed for the measurement noise
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Last timestamp of the series (defaults to the current hour)
        #[arg(long, value_name = "TIME")]
        end: Option<String>,
        /// Sensor id written on every row
        #[arg(long, default_value = "sensor-1")]
        sensor_id: String,
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Collapse flat-lined runs in a readings CSV
    Dedup {
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Dedup and build the persisted feature table
    Preprocess {
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Dedup, preprocess, split, fit and evaluate; writes the feature table and model
    Train {
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "DIR")]
        output_dir: PathBuf,
    },
    /// Forecast from the newest reading in a CSV (prints JSON)
    Forecast {
        /// Model artifact written by `train`
        #[arg(long, value_name = "FILE")]
        model: PathBuf,
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Minutes ahead, comma separated (overrides forecast.horizons)
        #[arg(long, value_delimiter = ',', value_name = "MINUTES")]
        horizons: Option<Vec<u32>>,
    },
}

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
