//! Error Types for the Acquisition Pipeline
//!
//! ## Design Philosophy
//!
//! Errors are returned on every sensor read, so they follow the same rules
//! as the rest of the hot path:
//!
//! 1. **No Heap Allocation**: reasons are `&'static str`, I/O failures keep
//!    only their `ErrorKind`.
//! 2. **Copy Semantics**: every error is `Copy` and can be stored in the
//!    loop's fault bookkeeping without cloning.
//! 3. **Severity in the Type**: the enum tells the caller whether to retry,
//!    substitute or abort.
//!
//! ## Error Categories
//!
//! ### Transient (tolerated)
//! - `SensorFault`: one failed read. The loop substitutes the last good
//!   sample and counts an anomaly.
//!
//! ### Fatal at startup
//! - `CalibrationError`: no baseline, no altitude. Abort.
//!
//! ### Fatal during a run
//! - `RunError::SensorLost`: too many consecutive faults, the sensor is gone.
//! - `RunError::Sink`: storage failed. Never retried, since a masked write
//!   failure silently loses flight data.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use barolog_core::{RunError, SinkError};
//!
//! fn exit_code(err: &RunError) -> i32 {
//!     match err {
//!         RunError::SensorLost { .. } => 2,
//!         RunError::Sink(SinkError::Closed) => 1,
//!         RunError::Sink(_) => 1,
//!         _ => 1,
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for pressure plausibility checks
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Pressure plausibility failures
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Value outside the sensor's operating range
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// The reading that failed validation
        value: f64,
        /// Lowest plausible reading
        min: f64,
        /// Highest plausible reading
        max: f64,
    },

    /// Value makes no physical sense (NaN, infinity, non-positive pressure)
    #[error("Invalid value: not a usable pressure")]
    InvalidValue,
}

/// A single failed sensor read
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorFault {
    /// Bus transaction failed (NACK, arbitration loss, CRC)
    #[error("Bus error: {reason}")]
    Bus {
        /// Driver-supplied description
        reason: &'static str,
    },

    /// No sample within the per-read timeout
    #[error("Sensor read timed out after {waited_ms} ms")]
    Timeout {
        /// How long the read was polled before giving up
        waited_ms: u64,
    },

    /// The driver returned a frame it could not decode
    #[error("Invalid sensor data: {reason}")]
    InvalidData {
        /// What was wrong with the frame
        reason: &'static str,
    },

    /// Device stopped responding entirely
    #[error("Sensor disconnected")]
    Disconnected,

    /// Finite source (replay) has no more samples
    #[error("End of sensor data")]
    EndOfData,
}

impl SensorFault {
    /// Whether the fault ends the data stream rather than a single read
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EndOfData)
    }
}

/// Calibration could not establish a baseline
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    /// Every window had too much pressure scatter
    #[error("Unstable environment: std dev {std_dev_hpa} hPa exceeds {max_deviation_hpa} hPa after {attempts} attempts")]
    Unstable {
        /// Windows drawn before giving up
        attempts: u32,
        /// Standard deviation of the last rejected window
        std_dev_hpa: f64,
        /// Configured acceptance bound
        max_deviation_hpa: f64,
    },

    /// Sensor kept failing during calibration
    #[error("Sensor fault during calibration after {consecutive} consecutive failures: {last}")]
    SensorFault {
        /// Consecutive failed reads when calibration gave up
        consecutive: u32,
        /// Most recent fault
        last: SensorFault,
    },

    /// Calibration parameters are unusable
    #[error("Invalid calibration config: {reason}")]
    InvalidConfig {
        /// Which parameter is wrong
        reason: &'static str,
    },
}

/// Log sink failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Underlying writer failed
    #[cfg(feature = "std")]
    #[error("I/O error: {kind:?}")]
    Io {
        /// Kind of the original `std::io::Error`
        kind: std::io::ErrorKind,
    },

    /// Row could not be encoded
    #[error("Format error: {reason}")]
    Format {
        /// What failed to encode
        reason: &'static str,
    },

    /// Sink was already closed
    #[error("Sink closed")]
    Closed,
}

#[cfg(feature = "std")]
impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io { kind: err.kind() }
    }
}

/// Fatal acquisition loop failures
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum RunError {
    /// Consecutive faults exceeded the threshold
    #[error("Sensor lost after {consecutive_faults} consecutive faults ({cycles} cycles logged)")]
    SensorLost {
        /// Length of the fault streak that triggered escalation
        consecutive_faults: u32,
        /// Cycles logged before the run stopped
        cycles: u64,
    },

    /// Writing or flushing the log failed
    #[error("Log sink failure: {0}")]
    Sink(SinkError),

    /// The loop already reached `Stopped`
    #[error("Acquisition loop already stopped")]
    AlreadyStopped,

    /// Loop parameters are unusable
    #[error("Invalid acquisition config: {reason}")]
    InvalidConfig {
        /// Which parameter is wrong
        reason: &'static str,
    },
}

impl From<SinkError> for RunError {
    fn from(err: SinkError) -> Self {
        Self::Sink(err)
    }
}

/// Log reader failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogReadError {
    /// Underlying reader failed
    #[cfg(feature = "std")]
    #[error("I/O error: {kind:?}")]
    Io {
        /// Kind of the original `std::io::Error`
        kind: std::io::ErrorKind,
    },

    /// A row could not be parsed
    #[error("Format error on line {line}: {reason}")]
    Format {
        /// What was wrong
        reason: &'static str,
        /// 1-based line number
        line: usize,
    },

    /// No more rows
    #[error("End of log")]
    EndOfLog,
}

#[cfg(feature = "std")]
impl From<std::io::Error> for LogReadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io { kind: err.kind() }
    }
}
