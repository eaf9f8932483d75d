//! Data model shared by every stage of the pipeline
//!
//! ```text
//! RawSample ──estimate──▶ AltitudeRecord ──flatten──▶ LogEntry ──append──▶ sink
//!     ▲                        ▲
//!     └── CalibrationBaseline ─┘   (created once, read-only afterwards)
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::physics::STANDARD_GRAVITY_MPS2;
use crate::time::Timestamp;

/// Three-axis acceleration in m/s²
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    /// X axis
    pub x: f64,
    /// Y axis
    pub y: f64,
    /// Z axis
    pub z: f64,
}

impl Vector3 {
    /// Build from components
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// One reading of every sensor on the bus
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawSample {
    /// Barometric pressure (hPa)
    pub pressure_hpa: f64,
    /// Barometer die temperature (°C)
    pub temperature_c: f64,
    /// Relative humidity (%), if the barometer reports it
    pub humidity_pct: Option<f64>,
    /// Acceleration (m/s²)
    pub accel_mps2: Vector3,
    /// Monotonic acquisition time
    pub timestamp: Timestamp,
}

impl RawSample {
    /// Sample with no humidity channel
    pub fn new(pressure_hpa: f64, temperature_c: f64, accel_mps2: Vector3, timestamp: Timestamp) -> Self {
        Self {
            pressure_hpa,
            temperature_c,
            humidity_pct: None,
            accel_mps2,
            timestamp,
        }
    }

    /// Attach a humidity reading
    pub fn with_humidity(mut self, humidity_pct: f64) -> Self {
        self.humidity_pct = Some(humidity_pct);
        self
    }

    /// Acceleration magnitude in g (≈1.0 at rest)
    pub fn accel_magnitude_g(&self) -> f64 {
        self.accel_mps2.magnitude() / STANDARD_GRAVITY_MPS2
    }

    /// Same reading re-stamped at `timestamp`
    pub fn restamped(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Ground-level pressure reference, established once per run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationBaseline {
    /// Mean pressure of the accepted window (hPa), always > 0
    pub baseline_pressure_hpa: f64,
    /// Standard deviation of the accepted window (hPa)
    pub std_dev_hpa: f64,
    /// Mean temperature of the accepted window (°C)
    pub temperature_c: f64,
    /// Samples in the accepted window
    pub sample_count: u32,
    /// Windows drawn, including the accepted one
    pub attempts: u32,
    /// Time the window was accepted
    pub established_at: Timestamp,
}

/// Altitude derived from one sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AltitudeRecord {
    /// Height above the calibration point (m)
    pub relative_altitude_m: f64,
    /// Height above the sea-level reference (m)
    pub absolute_altitude_m: f64,
    /// Sample the altitudes were derived from
    pub derived_from: RawSample,
    /// Altitudes were copied from an earlier record because the pressure was unusable
    pub substituted: bool,
}

/// Why a logged row is not a clean measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Anomaly {
    /// Clean row
    #[default]
    None,
    /// Read failed, last good sample substituted
    SensorFault,
    /// Pressure unusable, last valid altitude substituted
    InvalidPressure,
}

impl Anomaly {
    /// Column value used in the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SensorFault => "sensor_fault",
            Self::InvalidPressure => "invalid_pressure",
        }
    }

    /// Parse the column value back
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" | "" => Some(Self::None),
            "sensor_fault" => Some(Self::SensorFault),
            "invalid_pressure" => Some(Self::InvalidPressure),
            _ => None,
        }
    }

    /// Whether the row counts as an anomaly
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One persisted row
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogEntry {
    /// Cycle index, starting at 0
    pub cycle: u64,
    /// Monotonic timestamp (ms)
    pub timestamp_ms: Timestamp,
    /// Seconds since the run started
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub elapsed_s: f64,
    /// Pressure (hPa)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub pressure_hpa: f64,
    /// Temperature (°C)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub temperature_c: f64,
    /// Humidity (%), absent without a humidity channel
    pub humidity_pct: Option<f64>,
    /// Acceleration X (m/s²)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub accel_x: f64,
    /// Acceleration Y (m/s²)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub accel_y: f64,
    /// Acceleration Z (m/s²)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub accel_z: f64,
    /// Acceleration magnitude (g)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub accel_mag_g: f64,
    /// Height above the calibration point (m)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub relative_altitude_m: f64,
    /// Height above the sea-level reference (m)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub absolute_altitude_m: f64,
    /// Smoothed relative altitude (m)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub relative_filtered_m: f64,
    /// Smoothed absolute altitude (m)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub absolute_filtered_m: f64,
    /// Sea-level reference used for the absolute altitude (hPa)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub sea_level_hpa: f64,
    /// Baseline the relative altitude is measured against (hPa)
    #[cfg_attr(feature = "serde", serde(deserialize_with = "f64_or_nan"))]
    pub baseline_pressure_hpa: f64,
    /// Substitution marker
    pub anomaly_flag: Anomaly,
}

impl LogEntry {
    /// Column names, in persisted order
    pub const COLUMNS: [&'static str; 17] = [
        "cycle",
        "timestamp_ms",
        "elapsed_s",
        "pressure_hpa",
        "temperature_c",
        "humidity_pct",
        "accel_x",
        "accel_y",
        "accel_z",
        "accel_mag_g",
        "relative_altitude_m",
        "absolute_altitude_m",
        "relative_filtered_m",
        "absolute_filtered_m",
        "sea_level_hpa",
        "baseline_pressure_hpa",
        "anomaly_flag",
    ];

    /// Flatten a derived record into a row
    pub fn from_record(
        cycle: u64,
        elapsed_ms: u64,
        record: &AltitudeRecord,
        filtered_m: (f64, f64),
        sea_level_hpa: f64,
        baseline_pressure_hpa: f64,
        anomaly_flag: Anomaly,
    ) -> Self {
        let sample = &record.derived_from;
        Self {
            cycle,
            timestamp_ms: sample.timestamp,
            elapsed_s: elapsed_ms as f64 / 1000.0,
            pressure_hpa: sample.pressure_hpa,
            temperature_c: sample.temperature_c,
            humidity_pct: sample.humidity_pct,
            accel_x: sample.accel_mps2.x,
            accel_y: sample.accel_mps2.y,
            accel_z: sample.accel_mps2.z,
            accel_mag_g: sample.accel_magnitude_g(),
            relative_altitude_m: record.relative_altitude_m,
            absolute_altitude_m: record.absolute_altitude_m,
            relative_filtered_m: filtered_m.0,
            absolute_filtered_m: filtered_m.1,
            sea_level_hpa,
            baseline_pressure_hpa,
            anomaly_flag,
        }
    }

    /// Reconstruct the sample this row was logged from
    pub fn raw_sample(&self) -> RawSample {
        RawSample {
            pressure_hpa: self.pressure_hpa,
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
            accel_mps2: Vector3::new(self.accel_x, self.accel_y, self.accel_z),
            timestamp: self.timestamp_ms,
        }
    }
}

/// serde_json writes NaN and infinity as `null`; read them back as NaN
#[cfg(feature = "serde")]
fn f64_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(|value| value.unwrap_or(f64::NAN))
}

/// How a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// Configured deadline reached
    Deadline,
    /// External stop flag set
    Cancelled,
    /// Finite source ran out of samples
    SourceExhausted,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    /// Rows logged
    pub cycles: u64,
    /// Rows with a substituted value
    pub anomaly_count: u64,
    /// Failed reads
    pub sensor_faults: u64,
    /// Readings with unusable pressure
    pub invalid_pressures: u64,
    /// Longest streak of failed reads
    pub max_consecutive_faults: u32,
    /// Cycles that took longer than the sampling period
    pub overruns: u64,
    /// Wall-clock length of the run (ms)
    pub duration_ms: u64,
    /// Why the run ended
    pub stop_reason: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accel_magnitude_at_rest() {
        let sample = RawSample::new(1013.25, 20.0, Vector3::new(0.0, 0.0, 9.80665), 0);
        assert!((sample.accel_magnitude_g() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn anomaly_column_values() {
        for anomaly in [Anomaly::None, Anomaly::SensorFault, Anomaly::InvalidPressure] {
            assert_eq!(Anomaly::parse(anomaly.as_str()), Some(anomaly));
        }
        assert_eq!(Anomaly::parse("bogus"), None);
        assert!(!Anomaly::None.is_anomaly());
        assert!(Anomaly::SensorFault.is_anomaly());
    }

    #[test]
    fn entry_flattens_record() {
        let sample = RawSample::new(990.0, 18.5, Vector3::new(0.0, 0.0, 9.80665), 1_250)
            .with_humidity(40.0);
        let record = AltitudeRecord {
            relative_altitude_m: 95.0,
            absolute_altitude_m: 195.0,
            derived_from: sample,
            substituted: false,
        };

        let entry = LogEntry::from_record(5, 1_250, &record, (90.0, 190.0), 1013.25, 1001.27, Anomaly::None);
        assert_eq!(entry.cycle, 5);
        assert_eq!(entry.timestamp_ms, 1_250);
        assert!((entry.elapsed_s - 1.25).abs() < 1e-12);
        assert!((entry.accel_mag_g - 1.0).abs() < 1e-9);
        assert_eq!(entry.relative_filtered_m, 90.0);
        assert_eq!(entry.raw_sample(), sample);
    }

    #[cfg(feature = "std")]
    #[test]
    fn non_finite_values_survive_json() {
        let sample = RawSample::new(f64::NAN, 18.5, Vector3::new(0.0, 0.0, 9.80665), 500);
        let record = AltitudeRecord {
            relative_altitude_m: 12.0,
            absolute_altitude_m: 112.0,
            derived_from: sample,
            substituted: true,
        };
        let entry =
            LogEntry::from_record(2, 500, &record, (11.0, 111.0), 1013.25, 1001.27, Anomaly::InvalidPressure);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"pressure_hpa\":null"));

        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert!(back.pressure_hpa.is_nan());
        assert_eq!(back.relative_altitude_m, 12.0);
        assert_eq!(back.anomaly_flag, Anomaly::InvalidPressure);
    }

    #[test]
    fn restamp_keeps_readings() {
        let sample = RawSample::new(990.0, 18.5, Vector3::default(), 100).with_humidity(40.0);
        let later = sample.restamped(350);
        assert_eq!(later.timestamp, 350);
        assert_eq!(later.pressure_hpa, 990.0);
        assert_eq!(later.humidity_pct, Some(40.0));
    }
}
