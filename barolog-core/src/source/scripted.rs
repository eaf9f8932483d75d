//! Scripted sensor for deterministic tests
//!
//! Every read consumes one step of the script. Once the script is spent the
//! source reports `EndOfData` forever, so a loop over a scripted source
//! always terminates.
//!
//! ```rust
//! use barolog_core::source::ScriptedSource;
//! use barolog_core::SensorFault;
//!
//! let source = ScriptedSource::new()
//!     .samples([1013.2, 1013.3])
//!     .fault(SensorFault::Bus { reason: "nack" })
//!     .busy(3)
//!     .sample(1013.1);
//! assert_eq!(source.remaining(), 7);
//! ```

use alloc::collections::VecDeque;

use crate::{
    constants::physics::STANDARD_GRAVITY_MPS2,
    errors::SensorFault,
    traits::SensorSource,
    types::{RawSample, Vector3},
};

/// Temperature given to samples built from a bare pressure
const SCRIPT_TEMPERATURE_C: f64 = 20.0;

/// One scripted read outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Read succeeds with this sample
    Sample(RawSample),
    /// Read fails
    Fault(SensorFault),
    /// Conversion not finished yet
    Busy,
}

/// Source replaying a fixed script
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    polls: u64,
    reads: u64,
}

impl ScriptedSource {
    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any step
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push_back(step);
        self
    }

    /// Append a full sample
    pub fn raw(self, sample: RawSample) -> Self {
        self.step(Step::Sample(sample))
    }

    /// Append a resting sample at `pressure_hpa`
    pub fn sample(self, pressure_hpa: f64) -> Self {
        self.raw(resting(pressure_hpa))
    }

    /// Append resting samples
    pub fn samples<I: IntoIterator<Item = f64>>(mut self, pressures: I) -> Self {
        self.steps
            .extend(pressures.into_iter().map(|p| Step::Sample(resting(p))));
        self
    }

    /// Append a failing read
    pub fn fault(self, fault: SensorFault) -> Self {
        self.step(Step::Fault(fault))
    }

    /// Append `count` failing reads
    pub fn faults(mut self, fault: SensorFault, count: usize) -> Self {
        self.steps
            .extend(core::iter::repeat(Step::Fault(fault)).take(count));
        self
    }

    /// Append `count` busy polls
    pub fn busy(mut self, count: usize) -> Self {
        self.steps.extend(core::iter::repeat(Step::Busy).take(count));
        self
    }

    /// Steps not consumed yet
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Calls to `read`, busy polls included
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Completed reads (sample or fault)
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl SensorSource for ScriptedSource {
    fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
        self.polls += 1;
        match self.steps.pop_front() {
            Some(Step::Busy) => Err(nb::Error::WouldBlock),
            Some(Step::Sample(sample)) => {
                self.reads += 1;
                Ok(sample)
            }
            Some(Step::Fault(fault)) => {
                self.reads += 1;
                Err(nb::Error::Other(fault))
            }
            None => Err(nb::Error::Other(SensorFault::EndOfData)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn resting(pressure_hpa: f64) -> RawSample {
    RawSample::new(
        pressure_hpa,
        SCRIPT_TEMPERATURE_C,
        Vector3::new(0.0, 0.0, STANDARD_GRAVITY_MPS2),
        0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_script_in_order() {
        let mut source = ScriptedSource::new()
            .sample(1000.0)
            .busy(1)
            .fault(SensorFault::Disconnected);

        assert_eq!(source.read().map(|s| s.pressure_hpa), Ok(1000.0));
        assert_eq!(source.read(), Err(nb::Error::WouldBlock));
        assert_eq!(source.read(), Err(nb::Error::Other(SensorFault::Disconnected)));
        assert_eq!(source.polls(), 3);
        assert_eq!(source.reads(), 2);
    }

    #[test]
    fn exhausted_script_ends_data() {
        let mut source = ScriptedSource::new();
        assert_eq!(source.read(), Err(nb::Error::Other(SensorFault::EndOfData)));
        assert_eq!(source.read(), Err(nb::Error::Other(SensorFault::EndOfData)));
        assert_eq!(source.reads(), 0);
    }

    #[test]
    fn bulk_steps() {
        let source = ScriptedSource::new()
            .samples([1.0, 2.0, 3.0])
            .faults(SensorFault::Bus { reason: "crc" }, 4)
            .busy(2);
        assert_eq!(source.remaining(), 9);
    }
}
