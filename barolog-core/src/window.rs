//! Calibration Sample Window
//!
//! Calibration judges a burst of pressure readings by its mean and scatter.
//! The window keeps running statistics (Welford's update) instead of the
//! readings themselves, so any window size works without an allocator and
//! without a compile-time cap.
//!
//! A full window refuses further samples: it is judged as a whole and then
//! discarded, never slid.
//!
//! ## Statistics
//!
//! - `mean()`: arithmetic mean
//! - `std_dev()`: population standard deviation (divide by n), the quantity
//!   the deviation bound is stated in
//!
//! ```rust
//! use barolog_core::window::SampleWindow;
//!
//! let mut window = SampleWindow::with_target(4);
//! for p in [1013.0, 1013.2, 1013.1, 1012.9] {
//!     window.push(p);
//! }
//! assert!(window.is_complete());
//! assert!((window.mean().unwrap() - 1013.05).abs() < 1e-9);
//! ```

/// Running mean and scatter of a fixed number of readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    target: usize,
    count: usize,
    mean: f64,
    /// Sum of squared deviations from the running mean
    m2: f64,
}

impl SampleWindow {
    /// Window that completes after `target` samples
    pub fn with_target(target: usize) -> Self {
        Self {
            target,
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Add a sample. Returns `false` when the window is already complete.
    pub fn push(&mut self, value: f64) -> bool {
        if self.is_complete() {
            return false;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        true
    }

    /// Samples collected so far
    pub fn len(&self) -> usize {
        self.count
    }

    /// No samples yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Target size reached
    pub fn is_complete(&self) -> bool {
        self.count >= self.target
    }

    /// Target size
    pub fn target(&self) -> usize {
        self.target
    }

    /// Drop all samples, keep the target
    pub fn clear(&mut self) {
        *self = Self::with_target(self.target);
    }

    /// Arithmetic mean, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population standard deviation, `None` when empty
    pub fn std_dev(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        // Rounding can leave a hair below zero for identical readings
        let variance = (self.m2 / self.count as f64).max(0.0);
        Some(libm::sqrt(variance))
    }
}
