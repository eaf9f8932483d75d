//! Core Traits and Abstractions for barolog
//!
//! The pipeline only talks to hardware and storage through these traits:
//!
//! - [`time`] - Clock abstraction (timestamps and cooperative sleeping)
//! - [`source`] - Sensor reading source (barometer + accelerometer)
//! - [`sink`] - Append-only log sink
//!
//! Anything satisfying them is substitutable, so the calibrator and the
//! acquisition loop run the same against a Raspberry Pi bus driver, a
//! scripted test double or a replayed flight log.

pub mod sink;
pub mod source;
pub mod time;

pub use sink::LogSink;
pub use source::SensorSource;
pub use time::{Clock, TimeSource};
