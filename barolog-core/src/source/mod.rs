//! Sensor sources that need no hardware
//!
//! - `scripted` - exact sequences of samples, faults and busy polls (tests)
//! - `simulated` - synthetic flight from pad to landing (ground testing)
//! - `replay` - raw columns of a recorded log (requires `std`)

#[cfg(feature = "alloc")]
pub mod scripted;

pub mod simulated;

#[cfg(feature = "std")]
pub mod replay;

#[cfg(feature = "alloc")]
pub use scripted::{ScriptedSource, Step};

pub use simulated::{FlightPhase, FlightProfile, FlightProfileSource};

#[cfg(feature = "std")]
pub use replay::ReplaySource;
