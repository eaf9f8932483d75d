//! Reading logs back
//!
//! Parses what [`FileSink`](super::FileSink) writes. Lines that are blank or
//! start with `#` are skipped, as is the CSV header. A CSV header also fixes
//! the column order, so logs with reordered or extra columns still load.
//! Malformed rows are counted and skipped by [`LogReader::read_all`].
//!
//! ```rust,no_run
//! use barolog_core::sink::LogReader;
//!
//! let mut reader = LogReader::open("DATA/17-10-2026_(log 1).csv")?;
//! let rows = reader.read_all()?;
//! println!("{} rows, {} bad lines", rows.len(), reader.stats().parse_errors);
//! # Ok::<(), barolog_core::errors::LogReadError>(())
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use super::LogFormat;
use crate::{
    errors::LogReadError,
    types::{Anomaly, LogEntry},
};

/// Positions in [`LogEntry::COLUMNS`]
mod col {
    pub const CYCLE: usize = 0;
    pub const TIMESTAMP: usize = 1;
    pub const ELAPSED: usize = 2;
    pub const PRESSURE: usize = 3;
    pub const TEMPERATURE: usize = 4;
    pub const HUMIDITY: usize = 5;
    pub const ACCEL_X: usize = 6;
    pub const ACCEL_Y: usize = 7;
    pub const ACCEL_Z: usize = 8;
    pub const ACCEL_MAG: usize = 9;
    pub const RELATIVE: usize = 10;
    pub const ABSOLUTE: usize = 11;
    pub const RELATIVE_FILTERED: usize = 12;
    pub const ABSOLUTE_FILTERED: usize = 13;
    pub const SEA_LEVEL: usize = 14;
    pub const BASELINE: usize = 15;
    pub const ANOMALY: usize = 16;

    pub const COUNT: usize = 17;
}

/// Statistics for log reading
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogReaderStats {
    /// Rows parsed successfully
    pub rows_read: usize,
    /// Lines seen, including headers and comments
    pub lines_processed: usize,
    /// Lines that could not be parsed
    pub parse_errors: usize,
    /// Bytes consumed
    pub bytes_read: usize,
}

/// Reader for CSV and JSON Lines flight logs
pub struct LogReader<R: BufRead = BufReader<File>> {
    reader: R,
    format: LogFormat,
    columns: [Option<usize>; col::COUNT],
    header_seen: bool,
    line: String,
    line_no: usize,
    stats: LogReaderStats,
}

impl LogReader<BufReader<File>> {
    /// Open a log, picking the format from the extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LogReadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), LogFormat::from_path(path)))
    }
}

impl<R: BufRead> LogReader<R> {
    /// Read from any buffered reader
    pub fn from_reader(reader: R, format: LogFormat) -> Self {
        let mut columns = [None; col::COUNT];
        for (i, slot) in columns.iter_mut().enumerate() {
            *slot = Some(i);
        }
        Self {
            reader,
            format,
            columns,
            header_seen: false,
            line: String::new(),
            line_no: 0,
            stats: LogReaderStats::default(),
        }
    }

    /// Reading statistics
    pub fn stats(&self) -> &LogReaderStats {
        &self.stats
    }

    /// Layout being parsed
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Next row
    ///
    /// `Err(Format)` for a malformed line (the reader stays usable),
    /// `Err(EndOfLog)` once the input is exhausted.
    pub fn next_entry(&mut self) -> Result<LogEntry, LogReadError> {
        loop {
            self.line.clear();
            let bytes = self.reader.read_line(&mut self.line)?;
            if bytes == 0 {
                return Err(LogReadError::EndOfLog);
            }
            self.stats.bytes_read += bytes;
            self.stats.lines_processed += 1;
            self.line_no += 1;

            let line = self.line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = match self.format {
                LogFormat::Csv => {
                    if !self.header_seen && line.split(',').next().map(str::trim) == Some("cycle") {
                        self.header_seen = true;
                        self.columns = map_header(line);
                        continue;
                    }
                    parse_csv(line, &self.columns, self.line_no)
                }
                LogFormat::JsonLines => {
                    serde_json::from_str::<LogEntry>(line).map_err(|_| LogReadError::Format {
                        reason: "invalid JSON row",
                        line: self.line_no,
                    })
                }
            };

            match parsed {
                Ok(_) => self.stats.rows_read += 1,
                Err(_) => self.stats.parse_errors += 1,
            }
            return parsed;
        }
    }

    /// All remaining rows, skipping malformed lines
    pub fn read_all(&mut self) -> Result<Vec<LogEntry>, LogReadError> {
        let mut rows = Vec::new();
        loop {
            match self.next_entry() {
                Ok(entry) => rows.push(entry),
                Err(LogReadError::EndOfLog) => return Ok(rows),
                Err(LogReadError::Format { reason, line }) => {
                    log_warn!("Skipping log line {}: {}", line, reason);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<LogEntry, LogReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Err(LogReadError::EndOfLog) => None,
            other => Some(other),
        }
    }
}

fn map_header(header: &str) -> [Option<usize>; col::COUNT] {
    let names: Vec<&str> = header.split(',').map(str::trim).collect();
    let mut columns = [None; col::COUNT];
    for (slot, wanted) in columns.iter_mut().zip(LogEntry::COLUMNS.iter()) {
        *slot = names.iter().position(|name| name == wanted);
    }
    columns
}

fn parse_csv(
    line: &str,
    columns: &[Option<usize>; col::COUNT],
    line_no: usize,
) -> Result<LogEntry, LogReadError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let cell = |c: usize| {
        columns[c]
            .and_then(|i| fields.get(i).copied())
            .filter(|s| !s.is_empty())
    };
    let bad = |reason: &'static str| LogReadError::Format { reason, line: line_no };

    fn required<T: FromStr>(value: Option<&str>) -> Option<T> {
        value.and_then(|v| v.parse().ok())
    }

    let pressure_hpa = required(cell(col::PRESSURE)).ok_or_else(|| bad("invalid pressure_hpa"))?;
    let accel_x: f64 = required(cell(col::ACCEL_X)).ok_or_else(|| bad("invalid accel_x"))?;
    let accel_y: f64 = required(cell(col::ACCEL_Y)).ok_or_else(|| bad("invalid accel_y"))?;
    let accel_z: f64 = required(cell(col::ACCEL_Z)).ok_or_else(|| bad("invalid accel_z"))?;
    let relative_altitude_m =
        required(cell(col::RELATIVE)).ok_or_else(|| bad("invalid relative_altitude_m"))?;
    let absolute_altitude_m =
        required(cell(col::ABSOLUTE)).ok_or_else(|| bad("invalid absolute_altitude_m"))?;

    let humidity_pct = match cell(col::HUMIDITY) {
        Some(v) => Some(v.parse().map_err(|_| bad("invalid humidity_pct"))?),
        None => None,
    };
    let anomaly_flag = match cell(col::ANOMALY) {
        Some(v) => Anomaly::parse(v).ok_or_else(|| bad("unknown anomaly_flag"))?,
        None => Anomaly::None,
    };
    let accel_mag_g = match cell(col::ACCEL_MAG) {
        Some(v) => v.parse().map_err(|_| bad("invalid accel_mag_g"))?,
        None => crate::types::Vector3::new(accel_x, accel_y, accel_z).magnitude()
            / crate::constants::physics::STANDARD_GRAVITY_MPS2,
    };

    Ok(LogEntry {
        cycle: required(cell(col::CYCLE)).ok_or_else(|| bad("invalid cycle"))?,
        timestamp_ms: required(cell(col::TIMESTAMP)).ok_or_else(|| bad("invalid timestamp_ms"))?,
        elapsed_s: required(cell(col::ELAPSED)).ok_or_else(|| bad("invalid elapsed_s"))?,
        pressure_hpa,
        temperature_c: required(cell(col::TEMPERATURE))
            .ok_or_else(|| bad("invalid temperature_c"))?,
        humidity_pct,
        accel_x,
        accel_y,
        accel_z,
        accel_mag_g,
        relative_altitude_m,
        absolute_altitude_m,
        relative_filtered_m: required(cell(col::RELATIVE_FILTERED)).unwrap_or(relative_altitude_m),
        absolute_filtered_m: required(cell(col::ABSOLUTE_FILTERED)).unwrap_or(absolute_altitude_m),
        sea_level_hpa: required(cell(col::SEA_LEVEL)).ok_or_else(|| bad("invalid sea_level_hpa"))?,
        baseline_pressure_hpa: required(cell(col::BASELINE))
            .ok_or_else(|| bad("invalid baseline_pressure_hpa"))?,
        anomaly_flag,
    })
}
