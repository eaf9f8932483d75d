//! Physical Constants for barolog
//!
//! Atmosphere model used to turn pressure into altitude, plus the defaults
//! that depend on atmospheric behaviour.

// ===== INTERNATIONAL STANDARD ATMOSPHERE =====

/// Standard atmospheric pressure at sea level (hPa/mbar).
///
/// Reference for absolute altitude when no local QNH is known.
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_PRESSURE_HPA: f64 = 1013.25;

/// Standard temperature at sea level (K).
///
/// 15°C, the global average used in aviation.
///
/// Source: International Standard Atmosphere (ISA)
pub const SEA_LEVEL_TEMP_K: f64 = 288.15;

/// Temperature lapse rate in the troposphere (K/m).
///
/// 6.5°C per 1000 m, valid up to ~11 km.
///
/// Source: International Standard Atmosphere (ISA)
pub const TEMP_LAPSE_RATE_K_PER_M: f64 = 0.0065;

/// Standard gravitational acceleration (m/s²).
///
/// Also converts accelerometer readings to g.
///
/// Source: CGPM 1901, ISO 80000-3
pub const STANDARD_GRAVITY_MPS2: f64 = 9.80665;

/// Molar mass of dry air (kg/mol).
///
/// 78% N₂ + 21% O₂ + 1% Ar weighted average.
///
/// Source: U.S. Standard Atmosphere 1976
pub const AIR_MOLAR_MASS_KG_PER_MOL: f64 = 0.0289644;

/// Universal gas constant as used by the standard atmosphere (J/(mol·K)).
///
/// Source: U.S. Standard Atmosphere 1976
pub const GAS_CONSTANT_J_PER_MOL_K: f64 = 8.31432;

/// Barometric exponent R·L/(g·M) (dimensionless, ≈ 0.190263 = 1/5.2559).
pub const BAROMETRIC_EXPONENT: f64 =
    (GAS_CONSTANT_J_PER_MOL_K * TEMP_LAPSE_RATE_K_PER_M)
        / (STANDARD_GRAVITY_MPS2 * AIR_MOLAR_MASS_KG_PER_MOL);

/// Barometric scale height T₀/L (m, ≈ 44330.77).
pub const BAROMETRIC_SCALE_M: f64 = SEA_LEVEL_TEMP_K / TEMP_LAPSE_RATE_K_PER_M;

// ===== CALIBRATION AND FILTERING =====

/// Largest pressure standard deviation accepted for a baseline window (hPa).
///
/// BME280 RMS noise is ~0.2 hPa at standard oversampling; gusts on an open
/// pad or sensor warm-up drift push a 1 s window well past 0.5 hPa.
///
/// Source: Bosch BME280 datasheet, section 3.5
pub const DEFAULT_MAX_DEVIATION_HPA: f64 = 0.5;

/// Weight of the previous value in the altitude smoothing filter.
///
/// 0.90 keeps a ~10-sample memory, enough to hide BME280 noise at 4 Hz
/// without lagging apogee by more than a couple of seconds.
pub const DEFAULT_FILTER_ALPHA: f64 = 0.90;
