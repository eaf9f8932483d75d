//! Sensor Specifications
//!
//! Operating ranges and fault-handling thresholds for the supported parts
//! (BME280 barometer).

// ===== BAROMETER =====

/// Lowest pressure the barometer measures (hPa).
///
/// ~9 km altitude. Readings below this are glitches, not flight data.
///
/// Source: Bosch BME280 datasheet, operating range
pub const PRESSURE_SENSOR_MIN_HPA: f64 = 300.0;

/// Highest pressure the barometer measures (hPa).
///
/// Source: Bosch BME280 datasheet, operating range
pub const PRESSURE_SENSOR_MAX_HPA: f64 = 1100.0;

// ===== FAULT HANDLING =====

/// Consecutive failed reads tolerated before the sensor is declared lost.
///
/// At 4 Hz this is 2.5 s of silence: far longer than an I²C glitch, short
/// enough to stop logging garbage from a disconnected board.
pub const DEFAULT_MAX_CONSECUTIVE_FAULTS: u32 = 10;

// ===== CALIBRATION WINDOW =====

/// Samples averaged into the baseline pressure.
///
/// 20 samples at 50 ms spacing = 1 s on the pad.
pub const DEFAULT_CALIBRATION_WINDOW: usize = 20;

/// Calibration windows drawn before giving up on an unstable environment.
pub const DEFAULT_CALIBRATION_ATTEMPTS: u32 = 5;
