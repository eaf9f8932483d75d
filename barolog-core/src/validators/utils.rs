//! Shared validation helpers
//!
//! Pure functions, no allocation, safe to call from any stage.

use crate::errors::{ValidationError, ValidationResult};

/// Check if a value is within the specified range
pub fn check_range(value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if value < min || value > max {
        Err(ValidationError::OutOfRange { value, min, max })
    } else {
        Ok(())
    }
}

/// Pressure the barometric formula can take: finite and strictly positive
pub fn is_usable_pressure(pressure_hpa: f64) -> bool {
    pressure_hpa.is_finite() && pressure_hpa > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check() {
        assert!(check_range(5.0, 0.0, 10.0).is_ok());
        assert!(check_range(0.0, 0.0, 10.0).is_ok());
        assert!(check_range(-1.0, 0.0, 10.0).is_err());
        assert!(check_range(11.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn usable_pressure() {
        assert!(is_usable_pressure(1013.25));
        assert!(!is_usable_pressure(0.0));
        assert!(!is_usable_pressure(-3.0));
        assert!(!is_usable_pressure(f64::NAN));
        assert!(!is_usable_pressure(f64::INFINITY));
    }

    #[test]
    fn nan_must_be_caught_before_range_check() {
        // NaN comparisons are false, so it must be caught before check_range
        assert!(check_range(f64::NAN, 0.0, 10.0).is_ok());
        assert!(!is_usable_pressure(f64::NAN));
    }
}
