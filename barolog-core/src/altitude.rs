//! Pressure to Altitude
//!
//! ## The Barometric Formula
//!
//! Inside the troposphere the International Standard Atmosphere gives
//!
//! ```text
//! h = (T0 / L) · (1 − (p / p0)^(R·L / (g·M)))
//!   ≈ 44330.77 · (1 − (p / p0)^0.190263)
//! ```
//!
//! The same formula yields both altitudes the logger records:
//!
//! - **relative**: `p0` = calibration baseline, zero on the pad
//! - **absolute**: `p0` = sea-level reference (1013.25 hPa, or the local QNH)
//!
//! ## Unusable Pressure
//!
//! Estimation never fails. When the pressure cannot go through the formula
//! (zero, negative, NaN, or outside the validator's range) the previous
//! valid record's altitudes are carried forward and the record is marked
//! `substituted`. Before any valid record exists the pad is assumed:
//! 0 m relative, the baseline's altitude absolute.
//!
//! ```rust
//! use barolog_core::{estimate, AltitudeReference, CalibrationBaseline, RawSample, Vector3};
//!
//! let baseline = CalibrationBaseline {
//!     baseline_pressure_hpa: 1013.25,
//!     std_dev_hpa: 0.05,
//!     temperature_c: 15.0,
//!     sample_count: 20,
//!     attempts: 1,
//!     established_at: 0,
//! };
//! let sample = RawSample::new(1001.27, 15.0, Vector3::default(), 250);
//!
//! let record = estimate(&sample, &baseline, &AltitudeReference::default());
//! assert!((record.relative_altitude_m - 100.2).abs() < 0.1);
//! ```

use crate::{
    constants::physics::{
        BAROMETRIC_EXPONENT, BAROMETRIC_SCALE_M, DEFAULT_FILTER_ALPHA, SEA_LEVEL_PRESSURE_HPA,
    },
    types::{AltitudeRecord, CalibrationBaseline, RawSample},
    validators::{is_usable_pressure, PressureValidator, Validator},
};

/// Altitude (m) at pressure `p_hpa` above the level where pressure is `p0_hpa`
///
/// Both pressures must be finite and positive; callers check first.
pub fn barometric_altitude(p_hpa: f64, p0_hpa: f64) -> f64 {
    BAROMETRIC_SCALE_M * (1.0 - libm::pow(p_hpa / p0_hpa, BAROMETRIC_EXPONENT))
}

/// Sea-level pressure the absolute altitude is measured against
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AltitudeReference {
    /// Sea-level pressure (hPa)
    pub sea_level_hpa: f64,
}

impl Default for AltitudeReference {
    fn default() -> Self {
        Self {
            sea_level_hpa: SEA_LEVEL_PRESSURE_HPA,
        }
    }
}

impl AltitudeReference {
    /// Reference from the local altimeter setting
    pub fn qnh(sea_level_hpa: f64) -> Self {
        Self { sea_level_hpa }
    }

    /// Absolute altitude of a pressure under this reference
    pub fn altitude_of(&self, pressure_hpa: f64) -> f64 {
        barometric_altitude(pressure_hpa, self.sea_level_hpa)
    }
}

/// Derive relative and absolute altitude from one sample
///
/// Pure and deterministic. Unusable pressure yields the pad record with
/// `substituted` set.
pub fn estimate(
    sample: &RawSample,
    baseline: &CalibrationBaseline,
    reference: &AltitudeReference,
) -> AltitudeRecord {
    estimate_or_substitute(sample, baseline, reference, None)
}

/// Like [`estimate`], carrying `last_valid` forward when the pressure is unusable
pub fn estimate_or_substitute(
    sample: &RawSample,
    baseline: &CalibrationBaseline,
    reference: &AltitudeReference,
    last_valid: Option<&AltitudeRecord>,
) -> AltitudeRecord {
    if is_usable_pressure(sample.pressure_hpa) {
        derive(sample, baseline, reference)
    } else {
        substitute(sample, baseline, reference, last_valid)
    }
}

fn derive(
    sample: &RawSample,
    baseline: &CalibrationBaseline,
    reference: &AltitudeReference,
) -> AltitudeRecord {
    AltitudeRecord {
        relative_altitude_m: barometric_altitude(sample.pressure_hpa, baseline.baseline_pressure_hpa),
        absolute_altitude_m: reference.altitude_of(sample.pressure_hpa),
        derived_from: *sample,
        substituted: false,
    }
}

fn substitute(
    sample: &RawSample,
    baseline: &CalibrationBaseline,
    reference: &AltitudeReference,
    last_valid: Option<&AltitudeRecord>,
) -> AltitudeRecord {
    let (relative, absolute) = match last_valid {
        Some(prev) => (prev.relative_altitude_m, prev.absolute_altitude_m),
        None => (0.0, reference.altitude_of(baseline.baseline_pressure_hpa)),
    };

    AltitudeRecord {
        relative_altitude_m: relative,
        absolute_altitude_m: absolute,
        derived_from: *sample,
        substituted: true,
    }
}

/// Per-run estimator that remembers the last valid record
///
/// Pressure is checked against a [`PressureValidator`] before it reaches the
/// formula, so a stuck-bus value like 1520 hPa is substituted too.
#[derive(Debug, Clone)]
pub struct AltitudeEstimator {
    baseline: CalibrationBaseline,
    reference: AltitudeReference,
    validator: PressureValidator,
    last_valid: Option<AltitudeRecord>,
}

impl AltitudeEstimator {
    /// Estimator for one run
    pub fn new(baseline: CalibrationBaseline, reference: AltitudeReference) -> Self {
        Self {
            baseline,
            reference,
            validator: PressureValidator::default(),
            last_valid: None,
        }
    }

    /// Replace the plausibility check
    pub fn with_validator(mut self, validator: PressureValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Derive the next record
    pub fn next(&mut self, sample: &RawSample) -> AltitudeRecord {
        if self.validator.validate(sample.pressure_hpa).is_ok() {
            let record = derive(sample, &self.baseline, &self.reference);
            self.last_valid = Some(record);
            record
        } else {
            substitute(sample, &self.baseline, &self.reference, self.last_valid.as_ref())
        }
    }

    /// Most recent non-substituted record
    pub fn last_valid(&self) -> Option<&AltitudeRecord> {
        self.last_valid.as_ref()
    }

    /// Baseline this estimator measures against
    pub fn baseline(&self) -> &CalibrationBaseline {
        &self.baseline
    }

    /// Sea-level reference in use
    pub fn reference(&self) -> &AltitudeReference {
        &self.reference
    }
}

/// Exponential moving average over altitude
///
/// `alpha` is the weight of the history, in `[0, 1)`. 0.9 smooths BME280
/// noise (±1 m) while lagging a 100 m/s boost by about a second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeFilter {
    alpha: f64,
    value: Option<f64>,
}

impl Default for AltitudeFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_ALPHA)
    }
}

impl AltitudeFilter {
    /// Filter with history weight `alpha`
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    /// Feed one value, get the smoothed one back
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            None => x,
            Some(f) => self.alpha * f + (1.0 - self.alpha) * x,
        };
        self.value = Some(next);
        next
    }

    /// Current smoothed value
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// History weight
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forget the history
    pub fn reset(&mut self) {
        self.value = None;
    }
}
