//! Replay of a recorded log
//!
//! Feeds the raw columns of a previous run (pressure, temperature, humidity,
//! acceleration) back through the pipeline, e.g. to re-derive altitude with
//! a corrected QNH. Rows that were logged as sensor faults carried a
//! substituted sample, so by default they are replayed as faults again.

use std::path::Path;

use crate::{
    errors::{LogReadError, SensorFault},
    sink::LogReader,
    traits::SensorSource,
    types::{Anomaly, CalibrationBaseline, LogEntry, RawSample},
};

/// Source over the rows of a recorded log
#[derive(Debug, Clone)]
pub struct ReplaySource {
    entries: Vec<LogEntry>,
    position: usize,
    replay_faults: bool,
}

impl ReplaySource {
    /// Replay rows already in memory
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self {
            entries,
            position: 0,
            replay_faults: true,
        }
    }

    /// Load a CSV or JSON Lines log
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LogReadError> {
        let mut reader = LogReader::open(path)?;
        let entries = reader.read_all()?;
        Ok(Self::from_entries(entries))
    }

    /// Replay rows flagged `sensor_fault` as clean samples instead of faults
    pub fn with_faults(mut self, replay_faults: bool) -> Self {
        self.replay_faults = replay_faults;
        self
    }

    /// Rows in the log
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Log has no rows
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows not replayed yet
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }

    /// Start over
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Baseline the log was recorded against
    ///
    /// Window statistics are not persisted, so `std_dev_hpa`, `sample_count`
    /// and `attempts` are zero.
    pub fn recorded_baseline(&self) -> Option<CalibrationBaseline> {
        self.entries.first().map(|first| CalibrationBaseline {
            baseline_pressure_hpa: first.baseline_pressure_hpa,
            std_dev_hpa: 0.0,
            temperature_c: first.temperature_c,
            sample_count: 0,
            attempts: 0,
            established_at: first.timestamp_ms,
        })
    }

    /// Sea-level reference the log was recorded with
    pub fn recorded_sea_level_hpa(&self) -> Option<f64> {
        self.entries.first().map(|first| first.sea_level_hpa)
    }

    /// Average spacing between rows (ms), at least 1
    pub fn period_hint_ms(&self) -> Option<u64> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) if self.entries.len() > 1 => {
                let span = last.timestamp_ms.saturating_sub(first.timestamp_ms);
                Some((span / (self.entries.len() as u64 - 1)).max(1))
            }
            _ => None,
        }
    }
}

impl SensorSource for ReplaySource {
    fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
        let entry = self
            .entries
            .get(self.position)
            .ok_or(nb::Error::Other(SensorFault::EndOfData))?;
        self.position += 1;

        if self.replay_faults && entry.anomaly_flag == Anomaly::SensorFault {
            return Err(nb::Error::Other(SensorFault::InvalidData {
                reason: "row logged as sensor fault",
            }));
        }

        Ok(entry.raw_sample())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cycle: u64, pressure: f64, anomaly: Anomaly) -> LogEntry {
        LogEntry {
            cycle,
            timestamp_ms: 1_000 + cycle * 250,
            elapsed_s: cycle as f64 * 0.25,
            pressure_hpa: pressure,
            temperature_c: 14.0,
            humidity_pct: None,
            accel_x: 0.0,
            accel_y: 0.0,
            accel_z: 9.8,
            accel_mag_g: 1.0,
            relative_altitude_m: 0.0,
            absolute_altitude_m: 0.0,
            relative_filtered_m: 0.0,
            absolute_filtered_m: 0.0,
            sea_level_hpa: 1020.0,
            baseline_pressure_hpa: 1001.0,
            anomaly_flag: anomaly,
        }
    }

    #[test]
    fn replays_raw_columns_then_ends() {
        let mut source = ReplaySource::from_entries(vec![
            entry(0, 1001.0, Anomaly::None),
            entry(1, 990.0, Anomaly::None),
        ]);

        assert_eq!(source.read().map(|s| s.pressure_hpa), Ok(1001.0));
        assert_eq!(source.read().map(|s| s.pressure_hpa), Ok(990.0));
        assert_eq!(source.read(), Err(nb::Error::Other(SensorFault::EndOfData)));
    }

    #[test]
    fn logged_faults_replay_as_faults() {
        let entries = vec![entry(0, 1001.0, Anomaly::SensorFault)];

        let mut strict = ReplaySource::from_entries(entries.clone());
        assert!(matches!(
            strict.read(),
            Err(nb::Error::Other(SensorFault::InvalidData { .. }))
        ));

        let mut lenient = ReplaySource::from_entries(entries).with_faults(false);
        assert!(lenient.read().is_ok());
    }

    #[test]
    fn recorded_metadata() {
        let source = ReplaySource::from_entries(vec![
            entry(0, 1001.0, Anomaly::None),
            entry(4, 995.0, Anomaly::None),
        ]);

        let baseline = source.recorded_baseline().unwrap();
        assert_eq!(baseline.baseline_pressure_hpa, 1001.0);
        assert_eq!(source.recorded_sea_level_hpa(), Some(1020.0));
        assert_eq!(source.period_hint_ms(), Some(1000));
    }

    #[test]
    fn rows_in_one_millisecond_give_a_usable_period() {
        let mut first = entry(0, 1001.0, Anomaly::None);
        let mut second = entry(1, 1000.9, Anomaly::None);
        first.timestamp_ms = 7_000;
        second.timestamp_ms = 7_000;
        let source = ReplaySource::from_entries(vec![first, second]);

        let period = source.period_hint_ms().unwrap();
        assert_eq!(period, 1);
        assert!(crate::AcquisitionConfig::default()
            .with_period_ms(period)
            .validate()
            .is_ok());
    }

    #[test]
    fn empty_log() {
        let source = ReplaySource::from_entries(Vec::new());
        assert!(source.is_empty());
        assert_eq!(source.recorded_baseline(), None);
        assert_eq!(source.period_hint_ms(), None);
    }
}
