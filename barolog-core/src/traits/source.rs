//! Sensor Reading Source
//!
//! The barometer and accelerometer sit on one shared bus and are read
//! together. Reads follow a pull model built on `nb`:
//!
//! - `Ok(sample)` - conversion finished, sample ready
//! - `Err(nb::Error::WouldBlock)` - conversion still running, poll again
//! - `Err(nb::Error::Other(fault))` - the read failed
//!
//! The core never blocks inside a source. Callers bound the polling with a
//! per-read timeout (see [`read_with_timeout`](crate::acquisition::read_with_timeout)).
//!
//! ## Example Implementation
//!
//! ```rust
//! use barolog_core::{RawSample, SensorFault, SensorSource, Vector3};
//!
//! struct FixedBarometer {
//!     pressure_hpa: f64,
//!     reads: u64,
//! }
//!
//! impl SensorSource for FixedBarometer {
//!     fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
//!         self.reads += 1;
//!         Ok(RawSample::new(self.pressure_hpa, 20.0, Vector3::new(0.0, 0.0, 9.81), self.reads))
//!     }
//! }
//! ```

use crate::{errors::SensorFault, types::RawSample};

/// Anything that can hand out raw samples
pub trait SensorSource {
    /// Attempt to read one sample
    ///
    /// ## Contract
    ///
    /// - Must not block indefinitely
    /// - `WouldBlock` may be returned any number of times
    /// - After a fault the source may still be usable
    /// - `SensorFault::EndOfData` is sticky (finite sources only)
    fn read(&mut self) -> nb::Result<RawSample, SensorFault>;

    /// Human-readable name for logs
    fn name(&self) -> &str {
        "sensor"
    }
}

impl<S: SensorSource + ?Sized> SensorSource for &mut S {
    fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
        (**self).read()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
