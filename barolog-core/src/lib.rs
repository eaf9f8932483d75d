//! Core pipeline for barolog
//!
//! Turns a barometer + accelerometer into a flight log:
//! calibrate a ground-level baseline, derive relative and absolute altitude
//! from every pressure reading, and keep sampling at a fixed rate even when
//! the bus hiccups.
//!
//! Key constraints:
//! - One calibration per run, baseline is immutable afterwards
//! - Transient sensor faults never abort data capture
//! - Sink failures are never masked
//!
//! ```no_run
//! use core::sync::atomic::AtomicBool;
//! use barolog_core::{
//!     AcquisitionConfig, AcquisitionLoop, CalibrationConfig, Calibrator,
//!     sink::MemorySink, source::FlightProfileSource, time::ManualClock,
//! };
//!
//! let clock = ManualClock::new(0);
//! let mut source = FlightProfileSource::new(clock.clone());
//! let baseline = Calibrator::new(CalibrationConfig::default())
//!     .calibrate(&mut source, &clock)
//!     .expect("calibration");
//!
//! let mut sink = MemorySink::new();
//! let stop = AtomicBool::new(false);
//! let summary = AcquisitionLoop::new(AcquisitionConfig::default().with_deadline_ms(10_000))
//!     .run(&mut source, &baseline, &mut sink, &clock, &stop)
//!     .expect("run");
//! println!("{} cycles, {} anomalies", summary.cycles, summary.anomaly_count);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Logging compiles away when the `log` feature is off
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

pub mod acquisition;
pub mod altitude;
pub mod calibration;
pub mod constants;
pub mod errors;
pub mod sink;
pub mod source;
pub mod time;
pub mod traits;
pub mod types;
pub mod validators;
pub mod window;

#[cfg(feature = "std")]
pub mod analysis;

// Public API
pub use acquisition::{AcquisitionConfig, AcquisitionLoop, LoopState};
pub use altitude::{estimate, AltitudeEstimator, AltitudeFilter, AltitudeReference};
pub use calibration::{calibrate, CalibrationConfig, Calibrator};
pub use errors::{
    CalibrationError, LogReadError, RunError, SensorFault, SinkError, ValidationError,
};
pub use traits::{Clock, LogSink, SensorSource, TimeSource};
#[cfg(feature = "std")]
pub use analysis::FlightStats;
pub use types::{
    Anomaly, AltitudeRecord, CalibrationBaseline, LogEntry, RawSample, RunSummary, StopReason,
    Vector3,
};

/// Crate version, written into log headers by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
