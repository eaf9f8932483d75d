//! Log sinks and the matching reader
//!
//! - `memory` - rows kept in a `Vec`, with failure injection for tests
//! - `file` - CSV or JSON Lines on disk (requires `std`)
//! - `reader` - parses those files back into [`LogEntry`](crate::LogEntry) rows (requires `std`)

#[cfg(feature = "alloc")]
pub mod memory;

#[cfg(feature = "std")]
pub mod file;

#[cfg(feature = "std")]
pub mod reader;

#[cfg(feature = "alloc")]
pub use memory::MemorySink;

#[cfg(feature = "std")]
pub use file::{unique_log_path, FileSink, LogFormat};

#[cfg(feature = "std")]
pub use reader::{LogReader, LogReaderStats};
