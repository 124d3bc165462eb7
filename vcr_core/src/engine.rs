//! Critical Velocity engine.
//!
//! Two families of protocols:
//! - Fixed-duration single effort: D' is assumed (recommended preset, named
//!   preset, or user override) and subtracted from the test distance
//! - Two-point: CV and D' solved jointly from the line `distance = CV·time + D'`

use crate::catalog::test_definition;
use crate::types::{CvResult, DPrimeChoice, FixedDurationTest, ModelParams, TestInput, TestProtocol};
use crate::units::velocity_to_pace_per_km;
use crate::{Error, Result};

/// Resolve the D' (meters) used for a single-effort test
///
/// Custom values are clamped into the configured range. A non-finite custom
/// value, or a range with min above max, is rejected.
pub fn resolve_d_prime(test: FixedDurationTest, choice: DPrimeChoice, params: &ModelParams) -> Result<f64> {
    match choice {
        DPrimeChoice::Recommended => Ok(test_definition(test).recommended_preset.meters()),
        DPrimeChoice::Preset(preset) => Ok(preset.meters()),
        DPrimeChoice::Custom(value) => {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "D' must be a finite number, got {}",
                    value
                )));
            }
            if params.d_prime_min.is_nan() || params.d_prime_max.is_nan() || params.d_prime_min > params.d_prime_max {
                return Err(Error::InvalidInput(format!(
                    "D' range is empty: min {}m exceeds max {}m",
                    params.d_prime_min, params.d_prime_max
                )));
            }

            let clamped = value.clamp(params.d_prime_min, params.d_prime_max);
            if clamped != value {
                tracing::warn!(
                    "Custom D' {}m outside {}-{}m, clamped to {}m",
                    value,
                    params.d_prime_min,
                    params.d_prime_max,
                    clamped
                );
            }
            Ok(clamped)
        }
    }
}

fn ensure_positive_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Calculate CV from a single fixed-duration maximal effort
pub fn calculate_cv_fixed_duration(
    test: FixedDurationTest,
    distance: f64,
    d_prime: DPrimeChoice,
    params: &ModelParams,
) -> Result<CvResult> {
    ensure_positive_finite("Distance", distance)?;

    let duration = test.duration_seconds();
    let d_prime = resolve_d_prime(test, d_prime, params)?;

    let adjusted_distance = distance - d_prime;
    if adjusted_distance <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Distance {}m does not exceed D' {}m",
            distance, d_prime
        )));
    }

    let velocity_ms_raw = distance / duration;
    let velocity_ms = adjusted_distance / duration;

    tracing::debug!(
        "{} test: {}m, D' {}m -> CV {:.4} m/s (raw {:.4})",
        test.id(),
        distance,
        d_prime,
        velocity_ms,
        velocity_ms_raw
    );

    Ok(CvResult {
        protocol: TestProtocol::FixedDuration(test),
        velocity_ms,
        velocity_ms_raw,
        pace_sec_per_km: velocity_to_pace_per_km(velocity_ms),
        pace_sec_per_km_raw: velocity_to_pace_per_km(velocity_ms_raw),
        d_prime,
        d_prime_estimated: true,
        adjusted_distance,
    })
}

/// Calculate CV and D' from two maximal efforts
///
/// The second effort must be longer and farther than the first. These are
/// re-checked here even though the validator rejects them first.
pub fn calculate_cv_two_point(distance1: f64, time1: f64, distance2: f64, time2: f64) -> Result<CvResult> {
    ensure_positive_finite("Distance 1", distance1)?;
    ensure_positive_finite("Time 1", time1)?;
    ensure_positive_finite("Distance 2", distance2)?;
    ensure_positive_finite("Time 2", time2)?;

    if time2 <= time1 {
        return Err(Error::InvalidInput(
            "Second test must be longer than first test".into(),
        ));
    }
    if distance2 <= distance1 {
        return Err(Error::InvalidInput(
            "Second test distance should be greater than first test distance".into(),
        ));
    }

    let dt = time2 - time1;
    let velocity_ms = (distance2 - distance1) / dt;
    let d_prime = (distance1 * time2 - distance2 * time1) / dt;

    if d_prime < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Second test must be run at a slower average pace than the first (D' would be {:.1}m)",
            d_prime
        )));
    }

    let velocity_ms_raw = (distance1 / time1 + distance2 / time2) / 2.0;
    let adjusted_distance = ((distance1 - d_prime) + (distance2 - d_prime)) / 2.0;

    tracing::debug!(
        "2point test: ({}m, {}s) ({}m, {}s) -> CV {:.4} m/s, D' {:.1}m",
        distance1,
        time1,
        distance2,
        time2,
        velocity_ms,
        d_prime
    );

    Ok(CvResult {
        protocol: TestProtocol::TwoPoint,
        velocity_ms,
        velocity_ms_raw,
        pace_sec_per_km: velocity_to_pace_per_km(velocity_ms),
        pace_sec_per_km_raw: velocity_to_pace_per_km(velocity_ms_raw),
        d_prime,
        d_prime_estimated: false,
        adjusted_distance,
    })
}

/// Calculate CV for any test input
///
/// `d_prime` only applies to fixed-duration tests; two-point tests measure it.
pub fn calculate_cv(input: &TestInput, d_prime: DPrimeChoice, params: &ModelParams) -> Result<CvResult> {
    match *input {
        TestInput::FixedDuration { test, distance_m } => {
            calculate_cv_fixed_duration(test, distance_m, d_prime, params)
        }
        TestInput::TwoPoint {
            distance1,
            time1,
            distance2,
            time2,
        } => calculate_cv_two_point(distance1, time1, distance2, time2),
    }
}
