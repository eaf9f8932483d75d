//! Fixed-Rate Acquisition Loop
//!
//! ## State Machine
//!
//! ```text
//!          run()
//!  Idle ──────────▶ Sampling ──▶ Deriving ──▶ Logging ─┐
//!                      ▲                               │
//!                      └───────── sleep(period − work) ┘
//!                      │
//!   deadline / stop / end of data / fatal error
//!                      ▼
//!                   Stopped (terminal)
//! ```
//!
//! ## Fault Tolerance
//!
//! A failed read does not lose the cycle. The last good sample is re-stamped
//! and logged with `anomaly_flag = sensor_fault`, so the log keeps its
//! cadence and the gap is visible in post-flight analysis. Before any good
//! sample exists, the baseline itself stands in (the vehicle is on the pad).
//!
//! Only a streak of more than `max_consecutive_faults` failures ends the run
//! with [`RunError::SensorLost`]: at 4 Hz, ten faults in a row is 2.5 s of
//! nothing, and the sensor is gone rather than glitching. Readings with an
//! unusable pressure extend the streak like failed reads do; only a clean
//! reading resets it.
//!
//! ## Timing
//!
//! Each cycle sleeps for whatever is left of `period_ms`. An overrunning
//! cycle is counted and the next one starts immediately; missed cycles are
//! not caught up in a burst.
//!
//! ## Durability
//!
//! The sink is flushed on every exit path, fatal errors included. Sink
//! errors end the run immediately and are never retried.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::{
    altitude::{AltitudeEstimator, AltitudeFilter, AltitudeReference},
    constants::{
        physics::DEFAULT_FILTER_ALPHA,
        sensors::DEFAULT_MAX_CONSECUTIVE_FAULTS,
        time::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SAMPLE_PERIOD_MS},
    },
    errors::{RunError, SensorFault},
    time::{remaining_in_period, Timestamp},
    traits::{Clock, LogSink, SensorSource},
    types::{Anomaly, CalibrationBaseline, LogEntry, RawSample, RunSummary, StopReason, Vector3},
    validators::{is_usable_pressure, PressureValidator},
};

/// Read one sample, polling a busy sensor for at most `timeout_ms`
///
/// `WouldBlock` is retried every `poll_interval_ms`. When the timeout
/// expires the read fails with [`SensorFault::Timeout`].
pub fn read_with_timeout<S, C>(
    source: &mut S,
    clock: &C,
    timeout_ms: u64,
    poll_interval_ms: u64,
) -> Result<RawSample, SensorFault>
where
    S: SensorSource + ?Sized,
    C: Clock + ?Sized,
{
    let started = clock.now();
    loop {
        match source.read() {
            Ok(sample) => return Ok(sample),
            Err(nb::Error::Other(fault)) => return Err(fault),
            Err(nb::Error::WouldBlock) => {
                let waited = clock.elapsed_since(started);
                if waited >= timeout_ms {
                    return Err(SensorFault::Timeout { waited_ms: waited });
                }
                let pause = poll_interval_ms.max(1).min(timeout_ms - waited);
                clock.sleep_ms(pause);
            }
        }
    }
}

/// Loop parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AcquisitionConfig {
    /// Sampling period (ms)
    pub period_ms: u64,
    /// Stop after this long (ms since the run started); `None` runs until stopped
    pub deadline_ms: Option<u64>,
    /// Failed reads in a row tolerated before the sensor is declared lost
    pub max_consecutive_faults: u32,
    /// Per-read timeout (ms)
    pub read_timeout_ms: u64,
    /// Poll spacing while the sensor is busy (ms)
    pub poll_interval_ms: u64,
    /// History weight of the altitude smoothing, in [0, 1)
    pub filter_alpha: f64,
    /// Sea-level reference for absolute altitude
    pub reference: AltitudeReference,
    /// Plausibility check for pressure
    pub validator: PressureValidator,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_SAMPLE_PERIOD_MS,
            deadline_ms: None,
            max_consecutive_faults: DEFAULT_MAX_CONSECUTIVE_FAULTS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            filter_alpha: DEFAULT_FILTER_ALPHA,
            reference: AltitudeReference::default(),
            validator: PressureValidator::default(),
        }
    }
}

impl AcquisitionConfig {
    /// Set the sampling period (ms)
    pub fn with_period_ms(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms;
        self
    }

    /// Stop after `deadline_ms`
    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    /// Set the fault tolerance
    pub fn with_max_consecutive_faults(mut self, max_consecutive_faults: u32) -> Self {
        self.max_consecutive_faults = max_consecutive_faults;
        self
    }

    /// Set the per-read timeout (ms)
    pub fn with_read_timeout_ms(mut self, read_timeout_ms: u64) -> Self {
        self.read_timeout_ms = read_timeout_ms;
        self
    }

    /// Set the smoothing weight
    pub fn with_filter_alpha(mut self, filter_alpha: f64) -> Self {
        self.filter_alpha = filter_alpha;
        self
    }

    /// Measure absolute altitude against `sea_level_hpa`
    pub fn with_sea_level_hpa(mut self, sea_level_hpa: f64) -> Self {
        self.reference = AltitudeReference::qnh(sea_level_hpa);
        self
    }

    /// Set the plausibility check
    pub fn with_validator(mut self, validator: PressureValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), RunError> {
        let reason = if self.period_ms == 0 {
            "period_ms must be at least 1"
        } else if self.poll_interval_ms == 0 {
            "poll_interval_ms must be at least 1"
        } else if !(0.0..1.0).contains(&self.filter_alpha) {
            "filter_alpha must be in [0, 1)"
        } else if !is_usable_pressure(self.reference.sea_level_hpa) {
            "sea_level_hpa must be positive"
        } else {
            return Ok(());
        };
        Err(RunError::InvalidConfig { reason })
    }
}

/// Where the loop is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Not started
    #[default]
    Idle,
    /// Reading the sensor
    Sampling,
    /// Converting pressure to altitude
    Deriving,
    /// Appending the row
    Logging,
    /// Finished; terminal
    Stopped,
}

/// Counters kept while running
#[derive(Debug, Default)]
struct Tally {
    cycles: u64,
    anomalies: u64,
    sensor_faults: u64,
    invalid_pressures: u64,
    consecutive_faults: u32,
    max_consecutive_faults: u32,
    overruns: u64,
}

/// The acquisition loop
#[derive(Debug, Clone)]
pub struct AcquisitionLoop {
    config: AcquisitionConfig,
    state: LoopState,
}

impl AcquisitionLoop {
    /// Loop in `Idle`
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config,
            state: LoopState::Idle,
        }
    }

    /// Parameters in use
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Sample until the deadline, the stop flag or the end of the data
    ///
    /// `stop` is checked once per cycle boundary. Returns the run summary,
    /// or the fatal error that ended the run. Either way the loop ends in
    /// `Stopped` and cannot be run again.
    pub fn run<S, K, C>(
        &mut self,
        source: &mut S,
        baseline: &CalibrationBaseline,
        sink: &mut K,
        clock: &C,
        stop: &AtomicBool,
    ) -> Result<RunSummary, RunError>
    where
        S: SensorSource + ?Sized,
        K: LogSink + ?Sized,
        C: Clock + ?Sized,
    {
        if self.state == LoopState::Stopped {
            return Err(RunError::AlreadyStopped);
        }
        self.config.validate()?;
        if !is_usable_pressure(baseline.baseline_pressure_hpa) {
            return Err(RunError::InvalidConfig {
                reason: "baseline pressure must be positive",
            });
        }

        let started = clock.now();
        log_info!(
            "Acquisition started: source {}, period {} ms, baseline {:.2} hPa",
            source.name(),
            self.config.period_ms,
            baseline.baseline_pressure_hpa
        );

        let mut tally = Tally::default();
        let outcome = self.cycle(source, baseline, sink, clock, stop, started, &mut tally);
        self.state = LoopState::Stopped;

        match outcome {
            Ok(stop_reason) => {
                sink.flush()?;
                let summary = RunSummary {
                    cycles: tally.cycles,
                    anomaly_count: tally.anomalies,
                    sensor_faults: tally.sensor_faults,
                    invalid_pressures: tally.invalid_pressures,
                    max_consecutive_faults: tally.max_consecutive_faults,
                    overruns: tally.overruns,
                    duration_ms: clock.elapsed_since(started),
                    stop_reason,
                };
                log_info!(
                    "Acquisition stopped ({:?}): {} cycles, {} anomalies, {} overruns",
                    stop_reason,
                    summary.cycles,
                    summary.anomaly_count,
                    summary.overruns
                );
                Ok(summary)
            }
            Err(err) => {
                if let Err(_flush_err) = sink.flush() {
                    log_error!("Flush after fatal error failed: {}", _flush_err);
                }
                log_error!("Acquisition aborted: {}", err);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cycle<S, K, C>(
        &mut self,
        source: &mut S,
        baseline: &CalibrationBaseline,
        sink: &mut K,
        clock: &C,
        stop: &AtomicBool,
        started: Timestamp,
        tally: &mut Tally,
    ) -> Result<StopReason, RunError>
    where
        S: SensorSource + ?Sized,
        K: LogSink + ?Sized,
        C: Clock + ?Sized,
    {
        let config = self.config;
        let mut estimator =
            AltitudeEstimator::new(*baseline, config.reference).with_validator(config.validator);
        let mut relative_filter = AltitudeFilter::new(config.filter_alpha);
        let mut absolute_filter = AltitudeFilter::new(config.filter_alpha);
        let mut last_good: Option<RawSample> = None;

        loop {
            // Cycle boundary
            if config
                .deadline_ms
                .is_some_and(|deadline| clock.elapsed_since(started) >= deadline)
            {
                return Ok(StopReason::Deadline);
            }
            if stop.load(Ordering::Acquire) {
                return Ok(StopReason::Cancelled);
            }

            let cycle_start = clock.now();
            self.state = LoopState::Sampling;

            let read = read_with_timeout(source, clock, config.read_timeout_ms, config.poll_interval_ms);
            let now = clock.now();
            let (sample, mut anomaly) = match read {
                Ok(sample) => (sample.restamped(now), Anomaly::None),
                Err(SensorFault::EndOfData) => return Ok(StopReason::SourceExhausted),
                Err(fault) => {
                    tally.sensor_faults += 1;
                    tally.consecutive_faults += 1;
                    tally.max_consecutive_faults =
                        tally.max_consecutive_faults.max(tally.consecutive_faults);

                    if tally.consecutive_faults > config.max_consecutive_faults {
                        log_error!(
                            "Sensor lost after {} consecutive faults, last: {}",
                            tally.consecutive_faults,
                            fault
                        );
                        return Err(RunError::SensorLost {
                            consecutive_faults: tally.consecutive_faults,
                            cycles: tally.cycles,
                        });
                    }

                    log_warn!(
                        "Cycle {}: {} ({} in a row), reusing last good sample",
                        tally.cycles,
                        fault,
                        tally.consecutive_faults
                    );
                    let substitute = last_good.unwrap_or_else(|| pad_sample(baseline));
                    (substitute.restamped(now), Anomaly::SensorFault)
                }
            };

            self.state = LoopState::Deriving;
            let record = estimator.next(&sample);
            if record.substituted {
                if anomaly == Anomaly::None {
                    // Unusable readings extend the fault streak
                    anomaly = Anomaly::InvalidPressure;
                    tally.consecutive_faults += 1;
                    tally.max_consecutive_faults =
                        tally.max_consecutive_faults.max(tally.consecutive_faults);

                    if tally.consecutive_faults > config.max_consecutive_faults {
                        log_error!(
                            "Sensor lost after {} consecutive failed or unusable readings, last: {} hPa",
                            tally.consecutive_faults,
                            sample.pressure_hpa
                        );
                        return Err(RunError::SensorLost {
                            consecutive_faults: tally.consecutive_faults,
                            cycles: tally.cycles,
                        });
                    }
                }
                tally.invalid_pressures += 1;
                log_warn!(
                    "Cycle {}: implausible pressure {} hPa, altitude carried forward",
                    tally.cycles,
                    sample.pressure_hpa
                );
            } else if anomaly == Anomaly::None {
                tally.consecutive_faults = 0;
                last_good = Some(sample);
            }
            let filtered = (
                relative_filter.update(record.relative_altitude_m),
                absolute_filter.update(record.absolute_altitude_m),
            );

            self.state = LoopState::Logging;
            let entry = LogEntry::from_record(
                tally.cycles,
                now.saturating_sub(started),
                &record,
                filtered,
                config.reference.sea_level_hpa,
                baseline.baseline_pressure_hpa,
                anomaly,
            );
            sink.append(&entry)?;

            tally.cycles += 1;
            if anomaly.is_anomaly() {
                tally.anomalies += 1;
            }

            let work = clock.elapsed_since(cycle_start);
            if work > config.period_ms {
                tally.overruns += 1;
                log_debug!("Cycle overran: {} ms > {} ms", work, config.period_ms);
            }
            self.state = LoopState::Sampling;
            clock.sleep_ms(remaining_in_period(config.period_ms, work));
        }
    }
}

/// Stand-in sample before any good reading: at rest on the pad
fn pad_sample(baseline: &CalibrationBaseline) -> RawSample {
    RawSample::new(
        baseline.baseline_pressure_hpa,
        baseline.temperature_c,
        Vector3::default(),
        baseline.established_at,
    )
}
