//! Barometric Pressure Plausibility
//!
//! ## Failure Modes Seen on the Bench
//!
//! - **Brown-out**: the sensor resets mid-flight and reports 0 or the
//!   power-on register value until reconfigured
//! - **Torn read**: burst read interrupted, MSB from one conversion and LSB
//!   from the next; decodes to a plausible-looking but wrong value
//! - **Stuck bus**: SDA held low, every byte reads 0xFF and decodes to a
//!   pressure far above 1100 hPa
//!
//! The first and last are caught here. Torn reads inside the range are left
//! to post-flight analysis; rejecting them in flight would need a rate
//! limit, and a rocket legitimately drops tens of hPa per second.
//!
//! ## Configurations
//!
//! ```rust
//! use barolog_core::validators::PressureValidator;
//!
//! // BME280 operating range (default)
//! let standard = PressureValidator::default();
//!
//! // High-altitude balloon with a wider-range sensor
//! let balloon = PressureValidator::with_range(10.0, 1100.0);
//!
//! // Only reject numbers the formula cannot take
//! let permissive = PressureValidator::permissive();
//! ```

use crate::{
    constants::sensors::{PRESSURE_SENSOR_MAX_HPA, PRESSURE_SENSOR_MIN_HPA},
    errors::{ValidationError, ValidationResult},
};

use super::{utils, Validator};

/// Pressure validator for barometric readings in hPa
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PressureValidator {
    /// Minimum valid pressure in hPa
    min_hpa: f64,

    /// Maximum valid pressure in hPa
    max_hpa: f64,
}

impl Default for PressureValidator {
    fn default() -> Self {
        Self {
            min_hpa: PRESSURE_SENSOR_MIN_HPA,
            max_hpa: PRESSURE_SENSOR_MAX_HPA,
        }
    }
}

impl PressureValidator {
    /// Validator with a custom operating range
    pub fn with_range(min_hpa: f64, max_hpa: f64) -> Self {
        Self { min_hpa, max_hpa }
    }

    /// Accept any finite, positive pressure
    pub fn permissive() -> Self {
        Self {
            min_hpa: f64::MIN_POSITIVE,
            max_hpa: f64::MAX,
        }
    }

    /// Lower bound (hPa)
    pub fn min_hpa(&self) -> f64 {
        self.min_hpa
    }

    /// Upper bound (hPa)
    pub fn max_hpa(&self) -> f64 {
        self.max_hpa
    }
}

impl Validator for PressureValidator {
    fn validate(&self, value: f64) -> ValidationResult<()> {
        if !utils::is_usable_pressure(value) {
            return Err(ValidationError::InvalidValue);
        }

        utils::check_range(value, self.min_hpa, self.max_hpa)
    }
}
