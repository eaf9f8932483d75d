//! Post-flight statistics
//!
//! Summarises a log the way one looks at it after recovery: how long it
//! ran, how high it went and when, what the sensors saw, and how many rows
//! are not clean measurements.

use crate::types::{Anomaly, LogEntry};

/// Summary of a flight log
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlightStats {
    /// Rows in the log
    pub rows: usize,
    /// Time between first and last row (s)
    pub duration_s: f64,
    /// Highest relative altitude (m)
    pub apogee_m: f64,
    /// Elapsed time of the apogee row (s)
    pub apogee_time_s: f64,
    /// Highest smoothed relative altitude (m)
    pub apogee_filtered_m: f64,
    /// Lowest pressure (hPa)
    pub pressure_min_hpa: f64,
    /// Highest pressure (hPa)
    pub pressure_max_hpa: f64,
    /// Mean pressure (hPa)
    pub pressure_mean_hpa: f64,
    /// Mean temperature (°C)
    pub temperature_mean_c: f64,
    /// Largest acceleration magnitude (g)
    pub max_accel_g: f64,
    /// Rows flagged with an anomaly
    pub anomaly_count: usize,
    /// Lines that could not be parsed
    pub parse_errors: usize,
}

impl FlightStats {
    /// Statistics over `entries`; `None` for an empty log
    ///
    /// Pressure statistics skip rows flagged `invalid_pressure`.
    pub fn from_entries(entries: &[LogEntry]) -> Option<Self> {
        let first = entries.first()?;
        let last = entries.last()?;

        let mut stats = Self {
            rows: entries.len(),
            duration_s: last.elapsed_s - first.elapsed_s,
            apogee_m: f64::NEG_INFINITY,
            apogee_filtered_m: f64::NEG_INFINITY,
            pressure_min_hpa: f64::INFINITY,
            pressure_max_hpa: f64::NEG_INFINITY,
            max_accel_g: 0.0,
            ..Self::default()
        };

        let mut pressure_sum = 0.0;
        let mut pressure_rows = 0usize;
        let mut temperature_sum = 0.0;

        for entry in entries {
            if entry.relative_altitude_m > stats.apogee_m {
                stats.apogee_m = entry.relative_altitude_m;
                stats.apogee_time_s = entry.elapsed_s;
            }
            stats.apogee_filtered_m = stats.apogee_filtered_m.max(entry.relative_filtered_m);
            stats.max_accel_g = stats.max_accel_g.max(entry.accel_mag_g);
            temperature_sum += entry.temperature_c;

            if entry.anomaly_flag.is_anomaly() {
                stats.anomaly_count += 1;
            }
            if entry.anomaly_flag != Anomaly::InvalidPressure {
                stats.pressure_min_hpa = stats.pressure_min_hpa.min(entry.pressure_hpa);
                stats.pressure_max_hpa = stats.pressure_max_hpa.max(entry.pressure_hpa);
                pressure_sum += entry.pressure_hpa;
                pressure_rows += 1;
            }
        }

        stats.temperature_mean_c = temperature_sum / entries.len() as f64;
        if pressure_rows > 0 {
            stats.pressure_mean_hpa = pressure_sum / pressure_rows as f64;
        } else {
            stats.pressure_min_hpa = f64::NAN;
            stats.pressure_max_hpa = f64::NAN;
            stats.pressure_mean_hpa = f64::NAN;
        }

        Some(stats)
    }

    /// Attach the reader's parse error count
    pub fn with_parse_errors(mut self, parse_errors: usize) -> Self {
        self.parse_errors = parse_errors;
        self
    }
}

impl core::fmt::Display for FlightStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "rows:              {}", self.rows)?;
        writeln!(f, "duration:          {:.2} s", self.duration_s)?;
        writeln!(f, "apogee:            {:.1} m at {:.2} s", self.apogee_m, self.apogee_time_s)?;
        writeln!(f, "apogee (filtered): {:.1} m", self.apogee_filtered_m)?;
        writeln!(
            f,
            "pressure:          {:.2} / {:.2} / {:.2} hPa (min/mean/max)",
            self.pressure_min_hpa, self.pressure_mean_hpa, self.pressure_max_hpa
        )?;
        writeln!(f, "temperature mean:  {:.2} °C", self.temperature_mean_c)?;
        writeln!(f, "max acceleration:  {:.2} g", self.max_accel_g)?;
        writeln!(f, "anomalies:         {}", self.anomaly_count)?;
        write!(f, "parse errors:      {}", self.parse_errors)
    }
}
