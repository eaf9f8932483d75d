//! Clocks for the acquisition loop
//!
//! Provides the time sources the pipeline runs against:
//! - Monotonic clock backed by `std::time::Instant` (real runs)
//! - Manual clock where sleeping advances time (tests, simulation)

#[cfg(feature = "alloc")]
use alloc::rc::Rc;
#[cfg(feature = "alloc")]
use core::cell::Cell;

use crate::traits::{Clock, TimeSource};

/// Timestamp in milliseconds since the clock was started
pub type Timestamp = u64;

/// Monotonic clock using the host's steady timer
///
/// Starts at 0 when created, never goes backwards
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start a clock at 0 ms
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn sleep_ms(&self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(std::time::Duration::from_millis(ms));
        }
    }
}

/// Manually driven clock for tests and simulation
///
/// `sleep_ms` advances time instead of blocking, so a ten-minute flight
/// replays instantly. Clones share the same counter, which lets a simulated
/// sensor and the loop observe one timeline.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<Timestamp>>,
}

#[cfg(feature = "alloc")]
impl ManualClock {
    /// Clock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(timestamp)),
        }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.now_ms.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }
}

#[cfg(feature = "alloc")]
impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now_ms.get()
    }
}

#[cfg(feature = "alloc")]
impl Clock for ManualClock {
    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

/// Time left in a period after `elapsed_ms` of work, never negative
pub fn remaining_in_period(period_ms: u64, elapsed_ms: u64) -> u64 {
    period_ms.saturating_sub(elapsed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.sleep_ms(250);
        assert_eq!(clock.now(), 1250);

        clock.advance(50);
        assert_eq!(clock.now(), 1300);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(0);
        let observer = clock.clone();

        clock.sleep_ms(40);
        assert_eq!(observer.now(), 40);

        observer.set(500);
        assert_eq!(clock.now(), 500);
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        clock.sleep_ms(2);
        assert!(clock.now() >= first);
    }

    #[test]
    fn remaining_period() {
        assert_eq!(remaining_in_period(250, 40), 210);

        // Overrun: next cycle starts immediately
        assert_eq!(remaining_in_period(250, 400), 0);
    }
}
