//! Time-Related Constants
//!
//! Sampling periods, timeouts and calibration pacing.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== SAMPLING =====

/// Default acquisition period (milliseconds).
///
/// 4 Hz, the rate the BME280 sustains with temperature and humidity
/// oversampling enabled.
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 250;

/// Spacing between calibration samples (milliseconds).
pub const CALIBRATION_SAMPLE_DELAY_MS: u64 = 50;

// ===== READ TIMEOUTS =====

/// Per-read timeout (milliseconds).
///
/// A forced-mode BME280 conversion takes < 10 ms; 50 ms of `WouldBlock`
/// means the device is not answering.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 50;

/// Interval between polls while a conversion is pending (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2;
