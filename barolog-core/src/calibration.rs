//! Ground-Level Baseline Calibration
//!
//! ## Procedure
//!
//! 1. Draw `window_size` readings, `sample_delay_ms` apart
//! 2. Discard readings whose pressure fails the plausibility check
//! 3. Accept the window mean if its standard deviation is within
//!    `max_deviation_hpa`, otherwise draw a fresh window
//! 4. Give up after `max_attempts` windows
//!
//! A gusty pad, a hand still on the airframe or a sensor that has not
//! settled thermally all show up as scatter, and a baseline taken from
//! such a window would offset every relative altitude of the flight.
//!
//! ## Failure
//!
//! Calibration errors are fatal: without a baseline there is no relative
//! altitude, so the caller should abort startup.
//!
//! ```rust
//! use barolog_core::{calibrate, CalibrationConfig};
//! use barolog_core::source::ScriptedSource;
//! use barolog_core::time::ManualClock;
//!
//! let clock = ManualClock::new(0);
//! let mut source = ScriptedSource::new().samples([1001.2, 1001.3, 1001.25, 1001.3]);
//! let config = CalibrationConfig::default().with_window_size(4);
//!
//! let baseline = calibrate(&mut source, &clock, &config).unwrap();
//! assert!((baseline.baseline_pressure_hpa - 1001.2625).abs() < 1e-9);
//! ```

use crate::{
    acquisition::read_with_timeout,
    constants::{
        physics::DEFAULT_MAX_DEVIATION_HPA,
        sensors::{
            DEFAULT_CALIBRATION_ATTEMPTS, DEFAULT_CALIBRATION_WINDOW,
            DEFAULT_MAX_CONSECUTIVE_FAULTS,
        },
        time::{CALIBRATION_SAMPLE_DELAY_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_READ_TIMEOUT_MS},
    },
    errors::{CalibrationError, SensorFault},
    traits::{Clock, SensorSource},
    types::CalibrationBaseline,
    validators::{PressureValidator, Validator},
    window::SampleWindow,
};

/// Calibration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationConfig {
    /// Readings per window, at least 1
    pub window_size: usize,
    /// Largest accepted standard deviation (hPa)
    pub max_deviation_hpa: f64,
    /// Windows drawn before giving up
    pub max_attempts: u32,
    /// Spacing between readings (ms)
    pub sample_delay_ms: u64,
    /// Failed reads in a row tolerated before giving up
    pub max_consecutive_faults: u32,
    /// Per-read timeout (ms)
    pub read_timeout_ms: u64,
    /// Poll spacing while the sensor is busy (ms)
    pub poll_interval_ms: u64,
    /// Plausibility check applied to every reading
    pub validator: PressureValidator,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_CALIBRATION_WINDOW,
            max_deviation_hpa: DEFAULT_MAX_DEVIATION_HPA,
            max_attempts: DEFAULT_CALIBRATION_ATTEMPTS,
            sample_delay_ms: CALIBRATION_SAMPLE_DELAY_MS,
            max_consecutive_faults: DEFAULT_MAX_CONSECUTIVE_FAULTS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            validator: PressureValidator::default(),
        }
    }
}

impl CalibrationConfig {
    /// Set the window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the deviation bound (hPa)
    pub fn with_max_deviation_hpa(mut self, max_deviation_hpa: f64) -> Self {
        self.max_deviation_hpa = max_deviation_hpa;
        self
    }

    /// Set the number of windows
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the reading spacing (ms)
    pub fn with_sample_delay_ms(mut self, sample_delay_ms: u64) -> Self {
        self.sample_delay_ms = sample_delay_ms;
        self
    }

    /// Set the fault tolerance
    pub fn with_max_consecutive_faults(mut self, max_consecutive_faults: u32) -> Self {
        self.max_consecutive_faults = max_consecutive_faults;
        self
    }

    /// Set the plausibility check
    pub fn with_validator(mut self, validator: PressureValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let reason = if self.window_size == 0 {
            "window_size must be at least 1"
        } else if self.max_deviation_hpa.is_nan() || self.max_deviation_hpa < 0.0 {
            "max_deviation_hpa must be non-negative"
        } else if self.max_attempts == 0 {
            "max_attempts must be at least 1"
        } else if self.poll_interval_ms == 0 {
            "poll_interval_ms must be at least 1"
        } else {
            return Ok(());
        };
        Err(CalibrationError::InvalidConfig { reason })
    }
}

/// Establishes the baseline for one run
#[derive(Debug, Clone, Copy, Default)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Calibrator with the given parameters
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Parameters in use
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Draw windows from `source` until one is stable
    pub fn calibrate<S, C>(
        &self,
        source: &mut S,
        clock: &C,
    ) -> Result<CalibrationBaseline, CalibrationError>
    where
        S: SensorSource + ?Sized,
        C: Clock + ?Sized,
    {
        calibrate(source, clock, &self.config)
    }
}

/// Establish a baseline from `source`
pub fn calibrate<S, C>(
    source: &mut S,
    clock: &C,
    config: &CalibrationConfig,
) -> Result<CalibrationBaseline, CalibrationError>
where
    S: SensorSource + ?Sized,
    C: Clock + ?Sized,
{
    config.validate()?;

    let mut faults = FaultStreak::new(config.max_consecutive_faults);
    let mut first_draw = true;
    let mut last_std_dev = 0.0;

    for attempt in 1..=config.max_attempts {
        let mut window = SampleWindow::with_target(config.window_size);
        let mut temperature_sum = 0.0;

        while !window.is_complete() {
            if !first_draw {
                clock.sleep_ms(config.sample_delay_ms);
            }
            first_draw = false;

            match read_with_timeout(source, clock, config.read_timeout_ms, config.poll_interval_ms) {
                Ok(sample) if config.validator.validate(sample.pressure_hpa).is_ok() => {
                    faults.reset();
                    window.push(sample.pressure_hpa);
                    temperature_sum += sample.temperature_c;
                }
                Ok(sample) => {
                    log_debug!("Calibration discarded implausible pressure {} hPa", sample.pressure_hpa);
                    faults.record(SensorFault::InvalidData {
                        reason: "implausible pressure",
                    })?;
                }
                Err(SensorFault::EndOfData) => {
                    return Err(CalibrationError::SensorFault {
                        consecutive: faults.consecutive + 1,
                        last: SensorFault::EndOfData,
                    });
                }
                Err(fault) => {
                    log_debug!("Calibration read failed: {}", fault);
                    faults.record(fault)?;
                }
            }
        }

        // Window is complete, so never empty
        let (mean, std_dev) = match (window.mean(), window.std_dev()) {
            (Some(mean), Some(std_dev)) => (mean, std_dev),
            _ => continue,
        };

        if std_dev <= config.max_deviation_hpa {
            let baseline = CalibrationBaseline {
                baseline_pressure_hpa: mean,
                std_dev_hpa: std_dev,
                temperature_c: temperature_sum / window.len() as f64,
                sample_count: window.len() as u32,
                attempts: attempt,
                established_at: clock.now(),
            };
            log_info!(
                "Baseline {:.2} hPa (σ {:.3} hPa, {} samples, attempt {})",
                mean,
                std_dev,
                window.len(),
                attempt
            );
            return Ok(baseline);
        }

        log_debug!(
            "Calibration window {} rejected: σ {:.3} hPa > {:.3} hPa",
            attempt,
            std_dev,
            config.max_deviation_hpa
        );
        last_std_dev = std_dev;
    }

    Err(CalibrationError::Unstable {
        attempts: config.max_attempts,
        std_dev_hpa: last_std_dev,
        max_deviation_hpa: config.max_deviation_hpa,
    })
}

/// Consecutive failed reads
struct FaultStreak {
    consecutive: u32,
    limit: u32,
}

impl FaultStreak {
    fn new(limit: u32) -> Self {
        Self { consecutive: 0, limit }
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }

    fn record(&mut self, fault: SensorFault) -> Result<(), CalibrationError> {
        self.consecutive += 1;
        if self.consecutive > self.limit {
            log_warn!("Calibration giving up after {} failed reads: {}", self.consecutive, fault);
            return Err(CalibrationError::SensorFault {
                consecutive: self.consecutive,
                last: fault,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{source::ScriptedSource, time::ManualClock, traits::TimeSource};

    fn quick() -> CalibrationConfig {
        CalibrationConfig::default().with_window_size(5).with_max_attempts(3)
    }

    #[test]
    fn accepts_stable_window() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new().samples([1001.2, 1001.3, 1001.25, 1001.3, 1001.2]);

        let baseline = Calibrator::new(quick()).calibrate(&mut source, &clock).unwrap();
        assert!((baseline.baseline_pressure_hpa - 1001.25).abs() < 1e-9);
        assert!(baseline.std_dev_hpa < 0.05);
        assert_eq!(baseline.sample_count, 5);
        assert_eq!(baseline.attempts, 1);
        assert_eq!(baseline.temperature_c, 20.0);

        // Four gaps of 50 ms between five readings
        assert_eq!(baseline.established_at, 200);
        assert_eq!(clock.now(), 200);
    }

    #[test]
    fn retries_after_unstable_window() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new()
            .samples([1000.0, 1003.0, 1000.0, 1003.0, 1000.0])
            .samples([1001.0; 5]);

        let baseline = calibrate(&mut source, &clock, &quick()).unwrap();
        assert_eq!(baseline.attempts, 2);
        assert_eq!(baseline.baseline_pressure_hpa, 1001.0);
        assert_eq!(baseline.std_dev_hpa, 0.0);
    }

    #[test]
    fn unstable_after_all_attempts() {
        let clock = ManualClock::new(0);
        let noisy = [1000.0, 1004.0, 1000.0, 1004.0, 1000.0];
        let mut source = ScriptedSource::new()
            .samples(noisy)
            .samples(noisy)
            .samples(noisy)
            .samples([1001.0; 5]);

        let err = calibrate(&mut source, &clock, &quick()).unwrap_err();
        match err {
            CalibrationError::Unstable {
                attempts,
                std_dev_hpa,
                max_deviation_hpa,
            } => {
                assert_eq!(attempts, 3);
                assert!(std_dev_hpa > max_deviation_hpa);
            }
            other => panic!("unexpected {:?}", other),
        }

        // Exactly three windows drawn, the stable one never reached
        assert_eq!(source.reads(), 15);
        assert_eq!(source.remaining(), 5);
    }

    #[test]
    fn implausible_readings_are_discarded() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new()
            .sample(0.0)
            .samples([1001.0, 1001.0])
            .sample(1520.0)
            .samples([1001.0, 1001.0, 1001.0]);

        let baseline = calibrate(&mut source, &clock, &quick()).unwrap();
        assert_eq!(baseline.sample_count, 5);
        assert_eq!(baseline.baseline_pressure_hpa, 1001.0);
        assert_eq!(source.reads(), 7);
    }

    #[test]
    fn gives_up_on_persistent_faults() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new().faults(SensorFault::Bus { reason: "nack" }, 20);

        let err = calibrate(&mut source, &clock, &quick().with_max_consecutive_faults(3)).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::SensorFault {
                consecutive: 4,
                last: SensorFault::Bus { reason: "nack" },
            }
        );
    }

    #[test]
    fn exhausted_source_fails() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new().samples([1001.0, 1001.0]);

        let err = calibrate(&mut source, &clock, &quick()).unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::SensorFault {
                last: SensorFault::EndOfData,
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_config() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new();

        for config in [
            CalibrationConfig::default().with_window_size(0),
            CalibrationConfig::default().with_max_attempts(0),
            CalibrationConfig::default().with_max_deviation_hpa(-1.0),
            CalibrationConfig::default().with_max_deviation_hpa(f64::NAN),
        ] {
            assert!(matches!(
                calibrate(&mut source, &clock, &config),
                Err(CalibrationError::InvalidConfig { .. })
            ));
        }
        assert_eq!(source.polls(), 0);
    }

    #[test]
    fn large_window_is_accepted() {
        let clock = ManualClock::new(0);
        let mut source = ScriptedSource::new().samples([1001.27; 200]);
        let config = CalibrationConfig::default().with_window_size(100);

        let baseline = calibrate(&mut source, &clock, &config).unwrap();
        assert_eq!(baseline.sample_count, 100);
        assert!((baseline.baseline_pressure_hpa - 1001.27).abs() < 1e-9);
        assert_eq!(source.remaining(), 100);
    }
}
