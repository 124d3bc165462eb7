//! Velocity/duration curve implied by CV and D'.
//!
//! `distance = CV·t + D'` and `velocity = distance / t`: velocity decays
//! towards CV as duration grows.

use crate::types::CurvePoint;
use crate::{Error, Result};

/// Start of the default window (3 minutes)
pub const DEFAULT_MIN_TIME: f64 = 180.0;
/// End of the default window (70 minutes)
pub const DEFAULT_MAX_TIME: f64 = 4200.0;
pub const DEFAULT_POINTS: usize = 80;
/// Durations highlighted on the chart: 15, 30 and 60 minutes
pub const ANNOTATION_TIMES: [f64; 3] = [900.0, 1800.0, 3600.0];

/// Evenly spaced samples of the hyperbolic model
///
/// A clone keeps the current position, so one taken before iterating
/// replays the whole sequence.
#[derive(Clone, Debug)]
pub struct HyperbolicCurve {
    critical_speed: f64,
    d_prime: f64,
    min_time: f64,
    max_time: f64,
    step: f64,
    next_index: usize,
    points: usize,
}

impl HyperbolicCurve {
    /// Model value at an arbitrary duration
    pub fn at(&self, time_seconds: f64) -> CurvePoint {
        let distance_m = self.critical_speed * time_seconds + self.d_prime;
        CurvePoint {
            time_seconds,
            distance_m,
            velocity_ms: distance_m / time_seconds,
        }
    }

    /// Annotation points that fall inside the sampled window
    pub fn annotations(&self) -> Vec<CurvePoint> {
        ANNOTATION_TIMES
            .iter()
            .filter(|&&t| t >= self.min_time && t <= self.max_time)
            .map(|&t| self.at(t))
            .collect()
    }

    pub fn critical_speed(&self) -> f64 {
        self.critical_speed
    }

    pub fn d_prime(&self) -> f64 {
        self.d_prime
    }
}

impl Iterator for HyperbolicCurve {
    type Item = CurvePoint;

    fn next(&mut self) -> Option<CurvePoint> {
        if self.next_index >= self.points {
            return None;
        }
        let time = self.min_time + self.next_index as f64 * self.step;
        self.next_index += 1;
        Some(self.at(time))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.points - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HyperbolicCurve {}

/// Sample the curve between `min_time` and `max_time` (seconds, inclusive)
pub fn generate_hyperbolic_curve(
    critical_speed: f64,
    d_prime: f64,
    min_time: f64,
    max_time: f64,
    points: usize,
) -> Result<HyperbolicCurve> {
    if !critical_speed.is_finite() || critical_speed <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Critical speed must be positive, got {}",
            critical_speed
        )));
    }
    if !d_prime.is_finite() || d_prime < 0.0 {
        return Err(Error::InvalidInput(format!("D' must be non-negative, got {}", d_prime)));
    }
    if !min_time.is_finite() || min_time <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Curve start must be positive, got {}",
            min_time
        )));
    }
    if !max_time.is_finite() || max_time < min_time {
        return Err(Error::InvalidInput(format!(
            "Curve end {} must not be before start {}",
            max_time, min_time
        )));
    }

    let step = if points > 1 {
        (max_time - min_time) / (points - 1) as f64
    } else {
        0.0
    };

    Ok(HyperbolicCurve {
        critical_speed,
        d_prime,
        min_time,
        max_time,
        step,
        next_index: 0,
        points,
    })
}

/// Curve over the default window
pub fn default_curve(critical_speed: f64, d_prime: f64) -> Result<HyperbolicCurve> {
    generate_hyperbolic_curve(
        critical_speed,
        d_prime,
        DEFAULT_MIN_TIME,
        DEFAULT_MAX_TIME,
        DEFAULT_POINTS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_curve_shape() {
        let curve = default_curve(3.75, 150.0).unwrap();
        assert_eq!(curve.len(), 80);
        assert_eq!(curve.critical_speed(), 3.75);
        assert_eq!(curve.d_prime(), 150.0);

        let points: Vec<CurvePoint> = curve.collect();
        assert_eq!(points[0].time_seconds, 180.0);
        assert!((points[79].time_seconds - 4200.0).abs() < 1e-9);
        assert!((points[0].distance_m - (3.75 * 180.0 + 150.0)).abs() < 1e-9);

        // Velocity decays towards CV but never reaches it
        for pair in points.windows(2) {
            assert!(pair[0].velocity_ms > pair[1].velocity_ms);
            assert!(pair[1].velocity_ms > 3.75);
        }
    }

    #[test]
    fn test_curve_is_restartable() {
        let mut curve = generate_hyperbolic_curve(4.0, 200.0, 300.0, 600.0, 4).unwrap();
        let fresh = curve.clone();
        curve.next();
        assert_eq!(curve.len(), 3);
        assert_eq!(fresh.len(), 4);

        let times: Vec<f64> = fresh.map(|p| p.time_seconds).collect();
        assert_eq!(times, vec![300.0, 400.0, 500.0, 600.0]);
    }

    #[test]
    fn test_point_counts() {
        let single: Vec<CurvePoint> = generate_hyperbolic_curve(4.0, 200.0, 300.0, 600.0, 1)
            .unwrap()
            .collect();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].time_seconds, 300.0);

        let empty = generate_hyperbolic_curve(4.0, 200.0, 300.0, 600.0, 0).unwrap();
        assert_eq!(empty.count(), 0);

        // A zero-width window is still valid
        let flat = generate_hyperbolic_curve(4.0, 200.0, 300.0, 300.0, 3).unwrap();
        assert!(flat.map(|p| p.time_seconds).all(|t| t == 300.0));
    }

    #[test]
    fn test_degenerate_windows_rejected() {
        assert!(matches!(
            generate_hyperbolic_curve(4.0, 200.0, 0.0, 600.0, 10),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            generate_hyperbolic_curve(4.0, 200.0, 600.0, 300.0, 10),
            Err(Error::InvalidInput(_))
        ));
        assert!(generate_hyperbolic_curve(0.0, 200.0, 180.0, 600.0, 10).is_err());
        assert!(generate_hyperbolic_curve(4.0, -1.0, 180.0, 600.0, 10).is_err());
    }

    #[test]
    fn test_annotations() {
        let curve = default_curve(3.75, 150.0).unwrap();
        let marks = curve.annotations();
        assert_eq!(marks.len(), 3);
        assert!((marks[1].distance_m - 6900.0).abs() < 1e-9);

        let short = generate_hyperbolic_curve(3.75, 150.0, 180.0, 1200.0, 10).unwrap();
        assert_eq!(short.annotations().len(), 1);
    }
}
