//! Laws of the pressure-to-altitude conversion

mod common;

use barolog_core::{
    altitude::{barometric_altitude, estimate_or_substitute},
    constants::physics::BAROMETRIC_SCALE_M,
    estimate, AltitudeFilter, AltitudeReference, RawSample, Vector3,
};
use common::baseline_at;
use proptest::prelude::*;

fn sample(pressure_hpa: f64) -> RawSample {
    RawSample::new(pressure_hpa, 15.0, Vector3::new(0.0, 0.0, 9.80665), 0)
}

#[test]
fn reference_altitudes() {
    let baseline = baseline_at(1013.25);
    let reference = AltitudeReference::default();

    for (pressure, altitude) in [(1001.27, 100.205), (1000.0, 110.885), (950.0, 540.337), (900.0, 988.501)] {
        let record = estimate(&sample(pressure), &baseline, &reference);
        assert!(
            (record.absolute_altitude_m - altitude).abs() < 0.01,
            "{} hPa -> {} m",
            pressure,
            record.absolute_altitude_m
        );
        assert!((record.relative_altitude_m - altitude).abs() < 0.01);
    }
}

#[test]
fn relative_from_raised_baseline() {
    let record = estimate(&sample(900.0), &baseline_at(1001.27), &AltitudeReference::default());
    assert!((record.relative_altitude_m - 890.31).abs() < 0.01);
    assert!((record.absolute_altitude_m - 988.50).abs() < 0.01);
}

#[test]
fn substitution_never_produces_nan() {
    let baseline = baseline_at(1001.27);
    let reference = AltitudeReference::default();
    for bad in [0.0, -1.0, f64::NAN, f64::NEG_INFINITY] {
        let record = estimate_or_substitute(&sample(bad), &baseline, &reference, None);
        assert!(record.relative_altitude_m.is_finite());
        assert!(record.absolute_altitude_m.is_finite());
        assert!(record.substituted);
    }
}

proptest! {
    #[test]
    fn zero_at_any_baseline(p0 in 300.0f64..1100.0) {
        let record = estimate(&sample(p0), &baseline_at(p0), &AltitudeReference::default());
        prop_assert!(record.relative_altitude_m.abs() < 1e-6);
    }

    #[test]
    fn lower_pressure_is_higher(
        p0 in 800.0f64..1100.0,
        high in 300.0f64..1100.0,
        drop in 0.01f64..100.0,
    ) {
        let low = high - drop;
        prop_assume!(low > 300.0);

        let baseline = baseline_at(p0);
        let reference = AltitudeReference::default();
        let at_high = estimate(&sample(high), &baseline, &reference);
        let at_low = estimate(&sample(low), &baseline, &reference);

        prop_assert!(at_low.relative_altitude_m > at_high.relative_altitude_m);
        prop_assert!(at_low.absolute_altitude_m > at_high.absolute_altitude_m);
    }

    #[test]
    fn estimation_is_deterministic(p in 300.0f64..1100.0, p0 in 800.0f64..1100.0) {
        let baseline = baseline_at(p0);
        let reference = AltitudeReference::qnh(1020.0);
        prop_assert_eq!(
            estimate(&sample(p), &baseline, &reference),
            estimate(&sample(p), &baseline, &reference)
        );
    }

    #[test]
    fn relative_is_offset_of_absolute(p in 500.0f64..1100.0, p0 in 900.0f64..1050.0) {
        // Same formula, so both altitudes move together
        let a = barometric_altitude(p, 1013.25);
        let b = barometric_altitude(p0, 1013.25);
        let rel = barometric_altitude(p, p0);
        prop_assert!(((a - b) - rel * (1.0 - b / BAROMETRIC_SCALE_M)).abs() < 1e-6);
    }

    #[test]
    fn filter_stays_within_inputs(values in prop::collection::vec(-100.0f64..5000.0, 1..50)) {
        let mut filter = AltitudeFilter::default();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        for v in &values {
            let f = filter.update(*v);
            prop_assert!(f >= min - 1e-9 && f <= max + 1e-9);
        }
    }
}
