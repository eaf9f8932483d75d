//! In-memory sink for tests and short simulated runs

use alloc::vec::Vec;

use crate::{errors::SinkError, traits::LogSink, types::LogEntry};

/// Sink that keeps every row in memory
///
/// ```rust
/// use barolog_core::sink::MemorySink;
/// use barolog_core::LogSink;
///
/// let mut sink = MemorySink::new().failing_after(0);
/// sink.flush().unwrap();
/// assert_eq!(sink.flushes(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Vec<LogEntry>,
    flushes: u32,
    closed: bool,
    fail_after: Option<usize>,
    fail_flush: bool,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject appends once `rows` rows are stored
    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    /// Reject every flush
    pub fn failing_flush(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    /// Rows appended so far
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Take the rows out
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No rows yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successful flushes
    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if self.fail_after.is_some_and(|limit| self.entries.len() >= limit) {
            return Err(SinkError::Format {
                reason: "injected append failure",
            });
        }
        self.entries.push(*entry);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if self.fail_flush {
            return Err(SinkError::Format {
                reason: "injected flush failure",
            });
        }
        self.flushes += 1;
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
