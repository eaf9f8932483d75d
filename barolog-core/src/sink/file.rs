//! File-based log sink
//!
//! ## Supported Formats
//!
//! 1. **CSV**: header row, one row per cycle, empty cell for missing humidity
//! 2. **JSON Lines**: one object per cycle with the same keys, `null` humidity
//!
//! ```csv
//! cycle,timestamp_ms,elapsed_s,pressure_hpa,...,anomaly_flag
//! 0,3050,0,1001.27,...,none
//! ```
//!
//! ## Durability
//!
//! Rows go through a `BufWriter` and are flushed every `flush_every` rows
//! (default 1). A brown-out on landing then loses at most the row being
//! written. Raise it only when the storage is too slow for the sample rate.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{errors::SinkError, traits::LogSink, types::LogEntry};

/// Longest CSV row the sink will format
const MAX_ROW_LEN: usize = 512;

/// On-disk log layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// One JSON object per line
    #[cfg_attr(feature = "serde", serde(rename = "jsonl"))]
    JsonLines,
}

impl LogFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::JsonLines => "jsonl",
        }
    }

    /// Guess from a file name, CSV unless it ends in `.jsonl`/`.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("json") => {
                Self::JsonLines
            }
            _ => Self::Csv,
        }
    }
}

/// Log sink writing to a file (or any writer)
pub struct FileSink<W: Write = BufWriter<File>> {
    writer: W,
    format: LogFormat,
    rows: u64,
    unflushed: u32,
    flush_every: u32,
    closed: bool,
}

impl FileSink<BufWriter<File>> {
    /// Create (truncate) `path` and write the header
    pub fn create<P: AsRef<Path>>(path: P, format: LogFormat) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::from_writer(BufWriter::new(file), format)
    }
}

impl<W: Write> FileSink<W> {
    /// Wrap a writer and write the header
    pub fn from_writer(writer: W, format: LogFormat) -> Result<Self, SinkError> {
        let mut sink = Self {
            writer,
            format,
            rows: 0,
            unflushed: 0,
            flush_every: 1,
            closed: false,
        };
        if format == LogFormat::Csv {
            writeln!(sink.writer, "{}", LogEntry::COLUMNS.join(","))?;
        }
        Ok(sink)
    }

    /// Flush every `rows` rows (at least 1)
    pub fn with_flush_every(mut self, rows: u32) -> Self {
        self.flush_every = rows.max(1);
        self
    }

    /// Layout being written
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Rows written
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Give back the writer, e.g. to inspect an in-memory buffer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_csv(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut row: heapless::String<MAX_ROW_LEN> = heapless::String::new();
        format_csv_row(&mut row, entry).map_err(|_| SinkError::Format {
            reason: "CSV row too long",
        })?;
        self.writer.write_all(row.as_bytes())?;
        Ok(())
    }

    fn write_json(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, entry).map_err(|err| {
            if err.is_io() {
                SinkError::from(io::Error::from(err))
            } else {
                SinkError::Format {
                    reason: "JSON encoding failed",
                }
            }
        })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

fn format_csv_row<S: core::fmt::Write>(out: &mut S, e: &LogEntry) -> core::fmt::Result {
    write!(
        out,
        "{},{},{},{},{},",
        e.cycle, e.timestamp_ms, e.elapsed_s, e.pressure_hpa, e.temperature_c
    )?;
    if let Some(humidity) = e.humidity_pct {
        write!(out, "{}", humidity)?;
    }
    writeln!(
        out,
        ",{},{},{},{},{},{},{},{},{},{},{}",
        e.accel_x,
        e.accel_y,
        e.accel_z,
        e.accel_mag_g,
        e.relative_altitude_m,
        e.absolute_altitude_m,
        e.relative_filtered_m,
        e.absolute_filtered_m,
        e.sea_level_hpa,
        e.baseline_pressure_hpa,
        e.anomaly_flag.as_str()
    )
}

impl<W: Write> LogSink for FileSink<W> {
    fn append(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }

        match self.format {
            LogFormat::Csv => self.write_csv(entry)?,
            LogFormat::JsonLines => self.write_json(entry)?,
        }
        self.rows += 1;
        self.unflushed += 1;

        if self.unflushed >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.writer.flush()?;
        self.unflushed = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// First free `dir/<stem>_(log N).<ext>`, N counting from 1
///
/// Creates `dir` if needed. A new file per power-up keeps a reboot on the
/// pad from overwriting the previous flight.
pub fn unique_log_path<P: AsRef<Path>>(dir: P, stem: &str, ext: &str) -> io::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut n: u32 = 1;
    loop {
        let candidate = dir.join(format!("{}_(log {}).{}", stem, n, ext));
        if !candidate.exists() {
            return Ok(candidate);
        }
        n = n.checked_add(1).ok_or_else(|| {
            io::Error::new(io::ErrorKind::AlreadyExists, "no free log file name")
        })?;
    }
}
