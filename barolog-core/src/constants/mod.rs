//! Constants for barolog
//!
//! Every numeric default the pipeline relies on lives here, with units in
//! the name and a note on where the value comes from.
//!
//! ## Organization
//!
//! - **Physics**: atmosphere model and gravity
//! - **Sensors**: operating range of the supported barometer, fault thresholds
//! - **Time**: sampling periods, timeouts and calibration pacing
//!
//! ## Usage Guidelines
//!
//! 1. Use these constants instead of magic numbers
//! 2. Include units in new constant names
//! 3. Reference datasheets or standards where applicable

/// Atmosphere model constants and calibration defaults.
pub mod physics;

/// Sensor operating ranges and fault thresholds.
pub mod sensors;

/// Sampling periods, timeouts and calibration pacing.
pub mod time;

// Re-export commonly used constants for convenience
pub use physics::{
    SEA_LEVEL_PRESSURE_HPA, STANDARD_GRAVITY_MPS2, DEFAULT_FILTER_ALPHA,
    DEFAULT_MAX_DEVIATION_HPA,
};

pub use sensors::{
    PRESSURE_SENSOR_MIN_HPA, PRESSURE_SENSOR_MAX_HPA, DEFAULT_MAX_CONSECUTIVE_FAULTS,
    DEFAULT_CALIBRATION_WINDOW,
};

pub use time::{
    MS_PER_SECOND, DEFAULT_SAMPLE_PERIOD_MS, DEFAULT_READ_TIMEOUT_MS,
    CALIBRATION_SAMPLE_DELAY_MS,
};
