//! Race performance prediction.
//!
//! Two independent models:
//! - Hyperbolic critical speed model: `time = (distance - D') / CV`, used for
//!   race predictions and their confidence bounds
//! - Riegel power law: `t2 = t1 · (d2 / d1)^k`, used only to anchor the
//!   high-intensity zones of the race prediction-based zone system

use crate::catalog::{race_distances, DEFAULT_D_PRIME};
use crate::types::{RacePrediction, RacePredictionRange, RaceResult};
use crate::{Error, Result};

fn check_model_inputs(distance_m: f64, critical_speed: f64, d_prime: f64) -> Result<()> {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Race distance must be positive, got {}",
            distance_m
        )));
    }
    if !critical_speed.is_finite() || critical_speed <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Critical speed must be positive, got {}",
            critical_speed
        )));
    }
    if !d_prime.is_finite() || d_prime < 0.0 {
        return Err(Error::InvalidInput(format!(
            "D' must be non-negative, got {}",
            d_prime
        )));
    }
    Ok(())
}

/// Predict race time with the hyperbolic model
///
/// Returns `Ok(None)` when `distance_m <= d_prime`: the race is shorter than
/// the anaerobic reserve alone and the model does not apply.
pub fn predict_race_time(distance_m: f64, critical_speed: f64, d_prime: f64) -> Result<Option<RacePrediction>> {
    check_model_inputs(distance_m, critical_speed, d_prime)?;

    if distance_m <= d_prime {
        return Ok(None);
    }

    let time_seconds = (distance_m - d_prime) / critical_speed;
    Ok(Some(RacePrediction::from_time(distance_m, time_seconds)))
}

/// Predict race time with bounds from D' uncertainty
///
/// When D' is estimated, two more predictions are made with D' widened by
/// `uncertainty` in each direction (the lower value floored at zero). A larger
/// D' leaves less distance to cover at CV, so `D' + uncertainty` gives the
/// fastest bound (`min`) and `D' - uncertainty` the slowest (`max`).
/// Measured D' produces no bounds.
pub fn predict_race_time_with_confidence(
    distance_m: f64,
    critical_speed: f64,
    d_prime: f64,
    is_d_prime_estimated: bool,
    uncertainty: f64,
) -> Result<Option<RacePredictionRange>> {
    let Some(best) = predict_race_time(distance_m, critical_speed, d_prime)? else {
        return Ok(None);
    };

    let (min, max) = if is_d_prime_estimated {
        let low = (d_prime - uncertainty).max(0.0);
        let high = d_prime + uncertainty;
        (
            predict_race_time(distance_m, critical_speed, high)?,
            predict_race_time(distance_m, critical_speed, low)?,
        )
    } else {
        (None, None)
    };

    Ok(Some(RacePredictionRange {
        best,
        min,
        max,
        is_d_prime_estimated,
    }))
}

/// Predict every standard race distance
///
/// Distances the model cannot predict are omitted.
pub fn predict_all_races(
    critical_speed: f64,
    d_prime: f64,
    is_d_prime_estimated: bool,
    typical_only: bool,
    uncertainty: f64,
) -> Result<Vec<RaceResult>> {
    let mut results = Vec::new();

    for race in race_distances(typical_only) {
        match predict_race_time_with_confidence(
            race.distance_m,
            critical_speed,
            d_prime,
            is_d_prime_estimated,
            uncertainty,
        )? {
            Some(prediction) => results.push(RaceResult { race, prediction }),
            None => {
                tracing::debug!("Skipping {}: distance does not exceed D' {}m", race.name, d_prime);
            }
        }
    }

    Ok(results)
}

/// Predict race time by Riegel extrapolation from the hyperbolic model
///
/// The reference performance is the distance the CV/D' model gives for
/// `reference_seconds` (30 minutes by default).
pub fn predict_race_time_riegel(
    critical_speed: f64,
    d_prime: f64,
    distance_m: f64,
    fatigue_factor: f64,
    reference_seconds: f64,
) -> Result<RacePrediction> {
    check_model_inputs(distance_m, critical_speed, d_prime)?;
    if !fatigue_factor.is_finite() || fatigue_factor <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Fatigue factor must be positive, got {}",
            fatigue_factor
        )));
    }
    if !reference_seconds.is_finite() || reference_seconds <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Reference duration must be positive, got {}",
            reference_seconds
        )));
    }

    let reference_distance = critical_speed * reference_seconds + d_prime;
    let time_seconds = reference_seconds * (distance_m / reference_distance).powf(fatigue_factor);

    Ok(RacePrediction::from_time(distance_m, time_seconds))
}

/// Population default D' for single-effort tests
pub fn estimate_d_prime() -> f64 {
    DEFAULT_D_PRIME
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_predict_thousand_meters() {
        let prediction = predict_race_time(1000.0, 3.75, 150.0).unwrap().unwrap();
        assert!((prediction.time_seconds - 226.6667).abs() < 1e-3);
        assert!((prediction.pace_sec_per_km - 226.6667).abs() < 1e-3);
        assert!((prediction.pace_sec_per_mile - 226.6667 * crate::units::METERS_PER_MILE / 1000.0).abs() < 1e-2);
    }

    #[test]
    fn test_distance_within_d_prime_is_not_predicted() {
        assert!(predict_race_time(100.0, 3.75, 150.0).unwrap().is_none());
        assert!(predict_race_time(150.0, 3.75, 150.0).unwrap().is_none());
        assert!(predict_race_time(150.01, 3.75, 150.0).unwrap().is_some());
    }

    #[test]
    fn test_invalid_arguments_are_errors() {
        assert!(predict_race_time(0.0, 3.75, 150.0).is_err());
        assert!(predict_race_time(1000.0, 0.0, 150.0).is_err());
        assert!(predict_race_time(1000.0, 3.75, -1.0).is_err());
        assert!(predict_race_time(1000.0, f64::NAN, 150.0).is_err());
    }

    #[test]
    fn test_confidence_interval_only_when_estimated() {
        let measured = predict_race_time_with_confidence(5000.0, 3.75, 150.0, false, 100.0)
            .unwrap()
            .unwrap();
        assert!(measured.min.is_none());
        assert!(measured.max.is_none());
        assert!(!measured.is_d_prime_estimated);

        let estimated = predict_race_time_with_confidence(5000.0, 3.75, 250.0, true, 100.0)
            .unwrap()
            .unwrap();
        let min = estimated.min.unwrap();
        let max = estimated.max.unwrap();
        assert!((min.time_seconds - (5000.0 - 350.0) / 3.75).abs() < 1e-9);
        assert!((max.time_seconds - (5000.0 - 150.0) / 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_lower_d_prime_predicts_slower_time() {
        let low = predict_race_time(5000.0, 3.75, 150.0).unwrap().unwrap();
        let high = predict_race_time(5000.0, 3.75, 350.0).unwrap().unwrap();
        assert!(low.time_seconds > high.time_seconds);
    }

    #[test]
    fn test_confidence_lower_d_prime_clamped_at_zero() {
        let range = predict_race_time_with_confidence(1000.0, 4.0, 60.0, true, 100.0)
            .unwrap()
            .unwrap();
        let max = range.max.unwrap();
        assert!((max.time_seconds - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bound_beyond_distance_is_absent() {
        // Best estimate exists but D' + 100 exceeds the distance
        let range = predict_race_time_with_confidence(300.0, 4.0, 250.0, true, 100.0)
            .unwrap()
            .unwrap();
        assert!(range.min.is_none());
        assert!(range.max.is_some());
    }

    #[test]
    fn test_predict_all_races() {
        let typical = predict_all_races(3.75, 150.0, false, true, 100.0).unwrap();
        assert_eq!(typical.len(), 6);
        assert_eq!(typical[0].race.id, "mile");

        let all = predict_all_races(3.75, 150.0, true, false, 100.0).unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.iter().all(|r| r.prediction.min.is_some() && r.prediction.max.is_some()));

        // A huge D' makes short races unpredictable
        let sparse = predict_all_races(3.75, 2000.0, false, true, 100.0).unwrap();
        assert!(sparse.iter().all(|r| r.race.distance_m > 2000.0));
        assert_eq!(sparse.len(), 4);
    }

    #[test]
    fn test_riegel_reference_point() {
        // At the reference distance Riegel must return the reference duration
        let reference_distance = 3.75 * 1800.0 + 150.0;
        let prediction = predict_race_time_riegel(3.75, 150.0, reference_distance, 1.06, 1800.0).unwrap();
        assert!((prediction.time_seconds - 1800.0).abs() < 1e-9);
    }

    #[test]
    fn test_riegel_ten_k() {
        let prediction = predict_race_time_riegel(3.75, 150.0, 10000.0, 1.06, 1800.0).unwrap();
        let expected = 1800.0 * (10000.0f64 / 6900.0).powf(1.06);
        assert!((prediction.time_seconds - expected).abs() < 1e-9);

        // Higher fatigue factor slows longer races
        let slower = predict_race_time_riegel(3.75, 150.0, 10000.0, 1.08, 1800.0).unwrap();
        assert!(slower.time_seconds > prediction.time_seconds);
    }

    #[test]
    fn test_riegel_rejects_invalid_factor() {
        assert!(predict_race_time_riegel(3.75, 150.0, 5000.0, 0.0, 1800.0).is_err());
        assert!(predict_race_time_riegel(3.75, 150.0, 5000.0, 1.06, 0.0).is_err());
    }

    #[test]
    fn test_estimate_d_prime_default() {
        assert_eq!(estimate_d_prime(), 250.0);
    }

    proptest! {
        #[test]
        fn prop_confidence_bounds_are_ordered(
            cv in 1.5f64..7.0,
            d_prime in 0.0f64..600.0,
            distance in 200.0f64..50000.0,
        ) {
            prop_assume!(distance > d_prime);
            let range = predict_race_time_with_confidence(distance, cv, d_prime, true, 100.0)
                .unwrap()
                .unwrap();

            let max = range.max.unwrap();
            prop_assert!(range.best.time_seconds <= max.time_seconds);
            if let Some(min) = range.min {
                prop_assert!(min.time_seconds <= range.best.time_seconds);
                prop_assert!(min.time_seconds <= max.time_seconds);
            }
        }

        #[test]
        fn prop_prediction_positive_iff_beyond_d_prime(
            cv in 1.5f64..7.0,
            d_prime in 0.0f64..600.0,
            distance in 1.0f64..50000.0,
        ) {
            let prediction = predict_race_time(distance, cv, d_prime).unwrap();
            if distance <= d_prime {
                prop_assert!(prediction.is_none());
            } else {
                let p = prediction.unwrap();
                prop_assert!(p.time_seconds > 0.0 && p.time_seconds.is_finite());
            }
        }
    }
}
