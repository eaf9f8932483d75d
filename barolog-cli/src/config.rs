//! Logger configuration
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```json
//! {
//!   "calibration": { "max_deviation_hpa": 0.3 },
//!   "acquisition": { "period_ms": 100, "reference": { "sea_level_hpa": 1021.0 } },
//!   "output": { "dir": "DATA", "format": "jsonl" }
//! }
//! ```
//!
//! Command-line flags are applied on top of the file.

use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use barolog_core::{
    constants::time::MS_PER_SECOND, sink::LogFormat, source::FlightProfile, AcquisitionConfig,
    CalibrationConfig,
};
use serde::{Deserialize, Serialize};

use crate::cli::OutputArgs;

/// Where and how logs are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log directory, created if missing
    pub dir: PathBuf,
    /// File layout
    pub format: LogFormat,
    /// Flush the file every N rows
    pub flush_every: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("DATA"),
            format: LogFormat::Csv,
            flush_every: 1,
        }
    }
}

/// Everything a run needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Baseline calibration
    pub calibration: CalibrationConfig,
    /// Acquisition loop
    pub acquisition: AcquisitionConfig,
    /// Log files
    pub output: OutputConfig,
    /// Simulated flight (simulate only)
    pub flight: FlightProfile,
}

impl LoggerConfig {
    /// Load `path`, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, args: &OutputArgs) {
        if let Some(dir) = &args.out {
            self.output.dir = dir.clone();
        }
        if let Some(format) = args.format {
            self.output.format = format.into();
        }
        if let Some(period_ms) = args.period_ms {
            self.acquisition.period_ms = period_ms;
        }
        if let Some(duration_s) = args.duration_s {
            self.acquisition.deadline_ms = Some(duration_s * MS_PER_SECOND);
        }
        if let Some(sea_level_hpa) = args.sea_level_hpa {
            self.acquisition = self.acquisition.with_sea_level_hpa(sea_level_hpa);
        }
    }
}
