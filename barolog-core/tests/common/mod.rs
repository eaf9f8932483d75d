//! Shared fixtures for the integration tests
//!
//! - Baselines at known pressures
//! - Source wrappers that burn clock time or raise the stop flag
//! - Row comparison with a float tolerance (JSON parsing is best-effort precision)

#![allow(dead_code)]

use core::sync::atomic::{AtomicBool, Ordering};

use barolog_core::{
    source::ScriptedSource, time::ManualClock, CalibrationBaseline, LogEntry, RawSample,
    SensorFault, SensorSource,
};

/// Baseline as if calibrated at `pressure_hpa`
pub fn baseline_at(pressure_hpa: f64) -> CalibrationBaseline {
    CalibrationBaseline {
        baseline_pressure_hpa: pressure_hpa,
        std_dev_hpa: 0.05,
        temperature_c: 15.0,
        sample_count: 20,
        attempts: 1,
        established_at: 0,
    }
}

/// Resting samples at a steady pressure
pub fn steady(pressure_hpa: f64, count: usize) -> ScriptedSource {
    ScriptedSource::new().samples(std::iter::repeat(pressure_hpa).take(count))
}

/// Every read takes `delay_ms` of clock time
pub struct SlowSource<S> {
    pub inner: S,
    pub clock: ManualClock,
    pub delay_ms: u64,
}

impl<S: SensorSource> SensorSource for SlowSource<S> {
    fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
        self.clock.advance(self.delay_ms);
        self.inner.read()
    }
}

/// Raises `stop` once `after` reads completed
pub struct StopAfter<'a, S> {
    pub inner: S,
    pub stop: &'a AtomicBool,
    pub after: u64,
    pub reads: u64,
}

impl<'a, S> StopAfter<'a, S> {
    pub fn new(inner: S, stop: &'a AtomicBool, after: u64) -> Self {
        Self {
            inner,
            stop,
            after,
            reads: 0,
        }
    }
}

impl<S: SensorSource> SensorSource for StopAfter<'_, S> {
    fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
        let result = self.inner.read();
        self.reads += 1;
        if self.reads >= self.after {
            self.stop.store(true, Ordering::Release);
        }
        result
    }
}

/// Field-by-field comparison with tolerance on floats
pub fn assert_entries_close(actual: &[LogEntry], expected: &[LogEntry]) {
    assert_eq!(actual.len(), expected.len(), "row count");

    for (a, e) in actual.iter().zip(expected) {
        assert_eq!(a.cycle, e.cycle);
        assert_eq!(a.timestamp_ms, e.timestamp_ms);
        assert_eq!(a.anomaly_flag, e.anomaly_flag, "cycle {}", e.cycle);
        assert_eq!(a.humidity_pct.is_some(), e.humidity_pct.is_some());

        let pairs = [
            (a.elapsed_s, e.elapsed_s),
            (a.pressure_hpa, e.pressure_hpa),
            (a.temperature_c, e.temperature_c),
            (a.humidity_pct.unwrap_or(0.0), e.humidity_pct.unwrap_or(0.0)),
            (a.accel_x, e.accel_x),
            (a.accel_y, e.accel_y),
            (a.accel_z, e.accel_z),
            (a.accel_mag_g, e.accel_mag_g),
            (a.relative_altitude_m, e.relative_altitude_m),
            (a.absolute_altitude_m, e.absolute_altitude_m),
            (a.relative_filtered_m, e.relative_filtered_m),
            (a.absolute_filtered_m, e.absolute_filtered_m),
            (a.sea_level_hpa, e.sea_level_hpa),
            (a.baseline_pressure_hpa, e.baseline_pressure_hpa),
        ];
        for (x, y) in pairs {
            let same = (x.is_nan() && y.is_nan()) || (x - y).abs() < 1e-9;
            assert!(same, "cycle {}: {} != {}", e.cycle, x, y);
        }
    }
}
