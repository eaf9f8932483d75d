//! Clock traits
//!
//! `TimeSource` reads a monotonic millisecond counter; `Clock` adds the
//! ability to wait. The loop and the calibrator only ever see these traits,
//! so the same code runs against a real timer, a hardware tick counter or a
//! simulated timeline.

use crate::time::Timestamp;

/// Monotonic millisecond counter
///
/// Readings must never decrease while a run is in progress.
///
/// ```rust
/// use barolog_core::traits::TimeSource;
/// use barolog_core::time::Timestamp;
///
/// struct TickCounter {
///     ticks: u64,
/// }
///
/// impl TimeSource for TickCounter {
///     fn now(&self) -> Timestamp {
///         self.ticks // 1 kHz tick
///     }
/// }
/// ```
pub trait TimeSource {
    /// Milliseconds since the counter started
    fn now(&self) -> Timestamp;
}

/// Time source that can also wait
///
/// The loop's inter-cycle sleep and the read poll interval go through here.
pub trait Clock: TimeSource {
    /// Block (or advance simulated time) for `ms` milliseconds
    fn sleep_ms(&self, ms: u64);

    /// Milliseconds elapsed since `since`, saturating at 0
    fn elapsed_since(&self, since: Timestamp) -> u64 {
        self.now().saturating_sub(since)
    }
}
