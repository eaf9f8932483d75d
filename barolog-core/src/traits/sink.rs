//! Log Sink
//!
//! Append-only tabular writer. Rows arrive in cycle completion order and the
//! core never reorders or batches them; buffering is the sink's business.
//!
//! ## Contract
//!
//! - `append` writes exactly one row or fails
//! - `flush` pushes buffered rows to durable storage
//! - `close` flushes and releases the writer; later appends fail with
//!   `SinkError::Closed`
//! - Failures are reported, never retried by the core

use crate::{errors::SinkError, types::LogEntry};

/// Append-only destination for log rows
pub trait LogSink {
    /// Append one row
    fn append(&mut self, entry: &LogEntry) -> Result<(), SinkError>;

    /// Flush buffered rows
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Flush and release the writer
    fn close(&mut self) -> Result<(), SinkError>;
}

impl<K: LogSink + ?Sized> LogSink for &mut K {
    fn append(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        (**self).append(entry)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}
