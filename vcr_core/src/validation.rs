//! Input validation for test results.
//!
//! Validation failures are returned as data so a front end can show every
//! field error at once. Nothing in this module returns `crate::Error`.

use crate::catalog::test_definition;
use crate::format::{format_pace_value, parse_time_with_hours_to_seconds};
use crate::types::{FixedDurationTest, TestInput};
use crate::units::velocity_to_pace_per_km;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Faster than this (s/km) is beyond world-record pace
pub const MIN_REALISTIC_PACE_SEC_PER_KM: f64 = 150.0;
/// Slower than this (s/km) is closer to walking than a maximal effort
pub const MAX_REALISTIC_PACE_SEC_PER_KM: f64 = 720.0;

/// Inclusive numeric range for a field
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Generic distance bounds for two-point efforts (meters)
pub const DISTANCE_BOUNDS: Bounds = Bounds::new(100.0, 50000.0);
/// Generic time bounds for two-point efforts (seconds)
pub const TIME_BOUNDS: Bounds = Bounds::new(60.0, 7200.0);

/// A single field-level validation failure
#[derive(Clone, Debug, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    /// Missing, non-numeric, non-finite, non-positive or out of bounds
    #[error("{field}: {message}")]
    InvalidRange { field: String, message: String },

    /// Cross-field ordering violated
    #[error("{field}: {message}")]
    InvalidRelation {
        field: String,
        related: String,
        message: String,
    },
}

impl FieldError {
    fn range(field: &str, message: String) -> Self {
        FieldError::InvalidRange {
            field: field.to_string(),
            message,
        }
    }

    fn relation(field: &str, related: &str, message: &str) -> Self {
        FieldError::InvalidRelation {
            field: field.to_string(),
            related: related.to_string(),
            message: message.to_string(),
        }
    }

    /// Field the message should be shown against
    pub fn field(&self) -> &str {
        match self {
            FieldError::InvalidRange { field, .. } | FieldError::InvalidRelation { field, .. } => {
                field
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldError::InvalidRange { message, .. }
            | FieldError::InvalidRelation { message, .. } => message,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, FieldError::InvalidRelation { .. })
    }
}

/// Collected field errors, keyed by field name
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error; the first error reported for a field wins
    pub fn push(&mut self, error: FieldError) {
        self.errors
            .entry(error.field().to_string())
            .or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// Convert into a `Result`, yielding `value` when no errors were recorded
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, ValidationReport> {
        if self.is_valid() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.values().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Parse raw field text into a number
///
/// `label` is used in messages ("Distance is required"). Time fields also
/// accept `MM:SS` and `HH:MM:SS`.
pub fn parse_field(field: &str, label: &str, raw: Option<&str>) -> Result<f64, FieldError> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Err(FieldError::range(field, format!("{} is required", label))),
        Some(text) => text,
    };

    if text.contains(':') {
        return parse_time_with_hours_to_seconds(text)
            .map_err(|_| FieldError::range(field, format!("{} must be a number", label)));
    }

    text.parse::<f64>()
        .map_err(|_| FieldError::range(field, format!("{} must be a number", label)))
}

fn validate_number(field: &str, label: &str, unit: &str, value: f64, bounds: Bounds) -> Result<f64, FieldError> {
    if value.is_nan() {
        return Err(FieldError::range(field, format!("{} must be a number", label)));
    }
    if !value.is_finite() {
        return Err(FieldError::range(field, format!("{} must be a finite number", label)));
    }
    if value <= 0.0 {
        return Err(FieldError::range(field, format!("{} must be positive", label)));
    }
    if value < bounds.min {
        return Err(FieldError::range(
            field,
            format!("{} must be at least {} {}", label, bounds.min, unit),
        ));
    }
    if value > bounds.max {
        return Err(FieldError::range(
            field,
            format!("{} must be at most {} {}", label, bounds.max, unit),
        ));
    }
    Ok(value)
}

/// Validate a distance in meters against `bounds`
pub fn validate_distance(field: &str, value: f64, bounds: Bounds) -> Result<f64, FieldError> {
    validate_number(field, "Distance", "meters", value, bounds)
}

/// Validate a time in seconds against `bounds`
pub fn validate_time(field: &str, value: f64, bounds: Bounds) -> Result<f64, FieldError> {
    validate_number(field, "Time", "seconds", value, bounds)
}

/// Validate the distance of a fixed-duration test using the test's bounds
pub fn validate_fixed_duration(test: FixedDurationTest, distance: f64) -> ValidationReport {
    let mut report = ValidationReport::default();
    let bounds = test_definition(test).distance_bounds;
    if let Err(e) = validate_distance("distance", distance, bounds) {
        report.push(e);
    }
    report
}

/// Validate a two-point test
///
/// Individual fields use the generic bounds. Once all four are valid the
/// relational checks run: the second effort must be longer, farther and
/// slower-paced than the first.
pub fn validate_two_point(distance1: f64, time1: f64, distance2: f64, time2: f64) -> ValidationReport {
    let mut report = ValidationReport::default();

    let fields = [
        validate_distance("distance1", distance1, DISTANCE_BOUNDS),
        validate_time("time1", time1, TIME_BOUNDS),
        validate_distance("distance2", distance2, DISTANCE_BOUNDS),
        validate_time("time2", time2, TIME_BOUNDS),
    ];

    let mut all_valid = true;
    for result in fields {
        if let Err(e) = result {
            all_valid = false;
            report.push(e);
        }
    }

    if !all_valid {
        return report;
    }

    if time1 >= time2 {
        report.push(FieldError::relation(
            "time2",
            "time1",
            "Second test must be longer than first test",
        ));
    }

    if distance1 >= distance2 {
        report.push(FieldError::relation(
            "distance2",
            "distance1",
            "Second test distance should be greater than first test distance",
        ));
    }

    if report.is_valid() && distance1 / time1 <= distance2 / time2 {
        report.push(FieldError::relation(
            "time2",
            "time1",
            "Second test must be run at a slower average pace than the first test",
        ));
    }

    report
}

/// Validate any test input by protocol
pub fn validate_test_input(input: &TestInput) -> ValidationReport {
    match *input {
        TestInput::FixedDuration { test, distance_m } => validate_fixed_duration(test, distance_m),
        TestInput::TwoPoint {
            distance1,
            time1,
            distance2,
            time2,
        } => validate_two_point(distance1, time1, distance2, time2),
    }
}

/// Result of the soft plausibility check
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaceCheck {
    pub realistic: bool,
    pub pace_sec_per_km: f64,
    pub warning: Option<String>,
}

/// Flag implausible average paces without rejecting them
pub fn check_realistic_pace(distance: f64, duration: f64) -> PaceCheck {
    let pace_sec_per_km = velocity_to_pace_per_km(distance / duration);

    let warning = if pace_sec_per_km < MIN_REALISTIC_PACE_SEC_PER_KM {
        Some(format!(
            "This pace ({}/km) is faster than world records. Please verify your input.",
            format_pace_value(pace_sec_per_km)
        ))
    } else if pace_sec_per_km > MAX_REALISTIC_PACE_SEC_PER_KM {
        Some(format!(
            "This pace ({}/km) is very slow. Please verify your input.",
            format_pace_value(pace_sec_per_km)
        ))
    } else {
        None
    };

    if let Some(ref w) = warning {
        tracing::warn!("Unrealistic pace: {}", w);
    }

    PaceCheck {
        realistic: warning.is_none(),
        pace_sec_per_km,
        warning,
    }
}
