//! Synthetic Flight for Ground Testing
//!
//! ## Profile
//!
//! ```text
//!  altitude
//!     ▲            apogee
//!     │           ╱‾‾‾╲
//!     │     coast╱     ╲ descent (parachute, constant rate)
//!     │         ╱       ╲
//!     │   boost╱         ╲
//!     │_______╱           ╲________
//!     └──pad──┴─────────────┴landed──▶ time
//! ```
//!
//! - **Pad**: at rest, long enough for calibration
//! - **Boost**: constant thrust, sized so that coasting reaches the apogee
//! - **Coast**: ballistic, accelerometer reads near zero
//! - **Descent**: constant sink rate under canopy
//! - **Landed**: at rest; the source ends its data after a short dwell
//!
//! Pressure follows the standard atmosphere above the configured ground
//! elevation, with Gaussian-like noise and optional random bus faults. The
//! noise and fault generator is seeded, so a flight is reproducible.
//!
//! ```rust
//! use barolog_core::source::{FlightProfile, FlightProfileSource};
//! use barolog_core::time::ManualClock;
//!
//! let clock = ManualClock::new(0);
//! let source = FlightProfileSource::with_profile(
//!     clock.clone(),
//!     FlightProfile::default().with_apogee_m(300.0),
//! );
//! assert!(source.profile().flight_time_ms() > 0);
//! ```

use crate::{
    constants::physics::{
        BAROMETRIC_EXPONENT, BAROMETRIC_SCALE_M, SEA_LEVEL_PRESSURE_HPA, STANDARD_GRAVITY_MPS2,
        TEMP_LAPSE_RATE_K_PER_M,
    },
    errors::SensorFault,
    time::Timestamp,
    traits::{SensorSource, TimeSource},
    types::{RawSample, Vector3},
};

/// Shape of the simulated flight
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlightProfile {
    /// Launch site elevation above sea level (m)
    pub ground_elevation_m: f64,
    /// Sea-level pressure of the simulated weather (hPa)
    pub sea_level_hpa: f64,
    /// Ground temperature (°C)
    pub ground_temperature_c: f64,
    /// Relative humidity (%)
    pub humidity_pct: f64,
    /// Time on the pad before ignition (ms)
    pub pad_dwell_ms: u64,
    /// Motor burn time (ms)
    pub boost_ms: u64,
    /// Peak height above the pad (m)
    pub apogee_m: f64,
    /// Sink rate under canopy (m/s)
    pub descent_rate_mps: f64,
    /// Time on the ground after landing before data ends (ms); `None` never ends
    pub landed_dwell_ms: Option<u64>,
    /// Pressure noise, one standard deviation (hPa)
    pub pressure_noise_hpa: f64,
    /// Probability that a read fails, in [0, 1]
    pub fault_rate: f64,
    /// Noise and fault generator seed
    pub seed: u64,
}

impl Default for FlightProfile {
    fn default() -> Self {
        Self {
            ground_elevation_m: 100.0,
            sea_level_hpa: SEA_LEVEL_PRESSURE_HPA,
            ground_temperature_c: 15.0,
            humidity_pct: 45.0,
            pad_dwell_ms: 3_000,
            boost_ms: 1_500,
            apogee_m: 500.0,
            descent_rate_mps: 6.0,
            landed_dwell_ms: Some(2_000),
            pressure_noise_hpa: 0.03,
            fault_rate: 0.0,
            seed: 0x5eed_ba70,
        }
    }
}

impl FlightProfile {
    /// Set the apogee (m above pad)
    pub fn with_apogee_m(mut self, apogee_m: f64) -> Self {
        self.apogee_m = apogee_m;
        self
    }

    /// Set the read failure probability
    pub fn with_fault_rate(mut self, fault_rate: f64) -> Self {
        self.fault_rate = fault_rate;
        self
    }

    /// Set the generator seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the pressure noise (hPa)
    pub fn with_noise_hpa(mut self, noise_hpa: f64) -> Self {
        self.pressure_noise_hpa = noise_hpa;
        self
    }

    /// Set the time on the pad (ms)
    pub fn with_pad_dwell_ms(mut self, pad_dwell_ms: u64) -> Self {
        self.pad_dwell_ms = pad_dwell_ms;
        self
    }

    /// Constant boost acceleration (m/s², above gravity) that coasts to the apogee
    ///
    /// Burn height `a·tb²/2` plus coast height `(a·tb)²/(2g)` equals the apogee.
    pub fn boost_accel_mps2(&self) -> f64 {
        let tb = self.boost_ms as f64 / 1000.0;
        if tb <= 0.0 || self.apogee_m <= 0.0 {
            return 0.0;
        }
        let qa = tb * tb / (2.0 * STANDARD_GRAVITY_MPS2);
        let qb = tb * tb / 2.0;
        (-qb + libm::sqrt(qb * qb + 4.0 * qa * self.apogee_m)) / (2.0 * qa)
    }

    /// Time from ignition to apogee (ms)
    pub fn apogee_time_ms(&self) -> u64 {
        let tb = self.boost_ms as f64 / 1000.0;
        let burnout_velocity = self.boost_accel_mps2() * tb;
        ((tb + burnout_velocity / STANDARD_GRAVITY_MPS2) * 1000.0) as u64
    }

    /// Time from ignition to touchdown (ms)
    pub fn flight_time_ms(&self) -> u64 {
        let descent_s = if self.descent_rate_mps > 0.0 {
            self.apogee_m.max(0.0) / self.descent_rate_mps
        } else {
            0.0
        };
        self.apogee_time_ms() + (descent_s * 1000.0) as u64
    }

    /// Phase at `t_ms` since the source started
    pub fn phase_at(&self, t_ms: u64) -> FlightPhase {
        if t_ms < self.pad_dwell_ms {
            return FlightPhase::Pad;
        }
        let since_ignition = t_ms - self.pad_dwell_ms;
        if since_ignition < self.boost_ms {
            FlightPhase::Boost
        } else if since_ignition < self.apogee_time_ms() {
            FlightPhase::Coast
        } else if since_ignition < self.flight_time_ms() {
            FlightPhase::Descent
        } else {
            FlightPhase::Landed
        }
    }

    /// True height above the pad (m) and vertical proper acceleration (m/s²)
    pub fn kinematics_at(&self, t_ms: u64) -> (f64, f64) {
        let g = STANDARD_GRAVITY_MPS2;
        let a = self.boost_accel_mps2();
        let tb = self.boost_ms as f64 / 1000.0;
        let t = t_ms.saturating_sub(self.pad_dwell_ms) as f64 / 1000.0;

        match self.phase_at(t_ms) {
            FlightPhase::Pad | FlightPhase::Landed => (0.0, g),
            FlightPhase::Boost => (0.5 * a * t * t, a + g),
            FlightPhase::Coast => {
                let dt = t - tb;
                let v = a * tb;
                (0.5 * a * tb * tb + v * dt - 0.5 * g * dt * dt, 0.0)
            }
            FlightPhase::Descent => {
                let since_apogee = t - self.apogee_time_ms() as f64 / 1000.0;
                let h = self.apogee_m - self.descent_rate_mps * since_apogee;
                (h.max(0.0), g)
            }
        }
    }

    /// Standard-atmosphere pressure at `height_m` above the pad (hPa)
    pub fn pressure_at(&self, height_m: f64) -> f64 {
        let altitude = self.ground_elevation_m + height_m;
        self.sea_level_hpa * libm::pow(1.0 - altitude / BAROMETRIC_SCALE_M, 1.0 / BAROMETRIC_EXPONENT)
    }
}

/// Where the simulated vehicle is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    /// Waiting for ignition
    Pad,
    /// Motor burning
    Boost,
    /// Ballistic climb
    Coast,
    /// Under canopy
    Descent,
    /// On the ground again
    Landed,
}

/// Source generating a flight against a shared clock
#[derive(Debug, Clone)]
pub struct FlightProfileSource<C: TimeSource> {
    clock: C,
    profile: FlightProfile,
    started_at: Timestamp,
    rng: XorShift64,
    reads: u64,
    faults: u64,
}

impl<C: TimeSource> FlightProfileSource<C> {
    /// Default flight starting now
    pub fn new(clock: C) -> Self {
        Self::with_profile(clock, FlightProfile::default())
    }

    /// Custom flight starting now
    pub fn with_profile(clock: C, profile: FlightProfile) -> Self {
        let started_at = clock.now();
        Self {
            rng: XorShift64::new(profile.seed),
            clock,
            profile,
            started_at,
            reads: 0,
            faults: 0,
        }
    }

    /// Flight parameters
    pub fn profile(&self) -> &FlightProfile {
        &self.profile
    }

    /// Phase right now
    pub fn phase(&self) -> FlightPhase {
        self.profile.phase_at(self.clock.now().saturating_sub(self.started_at))
    }

    /// Reads served, faults included
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Injected faults
    pub fn faults(&self) -> u64 {
        self.faults
    }

    fn landed_long_enough(&self, t_ms: u64) -> bool {
        match self.profile.landed_dwell_ms {
            Some(dwell) => {
                t_ms >= self.profile.pad_dwell_ms + self.profile.flight_time_ms() + dwell
            }
            None => false,
        }
    }

    fn gaussian(&mut self) -> f64 {
        // Irwin-Hall with four draws, rescaled to unit variance
        let sum: f64 = (0..4).map(|_| self.rng.next_f64()).sum();
        (sum - 2.0) * libm::sqrt(3.0)
    }
}

impl<C: TimeSource> SensorSource for FlightProfileSource<C> {
    fn read(&mut self) -> nb::Result<RawSample, SensorFault> {
        let now = self.clock.now();
        let t_ms = now.saturating_sub(self.started_at);

        if self.landed_long_enough(t_ms) {
            return Err(nb::Error::Other(SensorFault::EndOfData));
        }

        self.reads += 1;
        if self.profile.fault_rate > 0.0 && self.rng.next_f64() < self.profile.fault_rate {
            self.faults += 1;
            return Err(nb::Error::Other(SensorFault::Bus {
                reason: "simulated NACK",
            }));
        }

        let (height, vertical_accel) = self.profile.kinematics_at(t_ms);
        let pressure = self.profile.pressure_at(height)
            + self.gaussian() * self.profile.pressure_noise_hpa;
        let temperature = self.profile.ground_temperature_c - TEMP_LAPSE_RATE_K_PER_M * height;
        let lateral = self.gaussian() * 0.05;

        let sample = RawSample::new(
            pressure,
            temperature,
            Vector3::new(lateral, -lateral, vertical_accel),
            now,
        )
        .with_humidity(self.profile.humidity_pct);

        Ok(sample)
    }

    fn name(&self) -> &str {
        "flight-profile"
    }
}

/// Small seeded generator for noise and fault injection
#[derive(Debug, Clone)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift
        Self {
            state: if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1)
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
