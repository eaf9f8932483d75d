//! Plausibility Checks for Raw Readings
//!
//! A barometer glitch rarely looks like an error: the driver hands back a
//! number, it is just the wrong one (0 hPa after a brown-out, 0x80000 raw
//! counts decoding to ~1500 hPa). These validators decide whether a pressure
//! may be turned into altitude at all.
//!
//! ## Validation Layers
//!
//! ### 1. Number Sanity
//! NaN, infinity and non-positive pressure are never usable.
//!
//! ### 2. Range Validation
//! The sensor's operating range: BME280 measures 300-1100 hPa, anything
//! outside is a decode glitch.
//!
//! ## Usage Example
//!
//! ```rust
//! use barolog_core::validators::{PressureValidator, Validator};
//!
//! let validator = PressureValidator::default();
//! assert!(validator.validate(1013.25).is_ok());
//! assert!(validator.validate(0.0).is_err());
//! ```

mod pressure;
mod utils;

pub use pressure::PressureValidator;
pub use utils::{check_range, is_usable_pressure};

use crate::errors::ValidationResult;

/// Validator for a single scalar reading
pub trait Validator {
    /// Validate one reading
    fn validate(&self, value: f64) -> ValidationResult<()>;
}
