//! Distance and pace unit conversions.
//!
//! Everything inside the engines is SI (meters, seconds, m/s). These helpers
//! are the only place where kilometers, miles and pace representations are
//! introduced, so every conversion goes through the same mile constant.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const METERS_PER_MILE: f64 = 1609.34;
pub const METERS_PER_KM: f64 = 1000.0;

/// Convert seconds per kilometer to seconds per mile
pub fn sec_per_km_to_sec_per_mile(seconds_per_km: f64) -> f64 {
    seconds_per_km * (METERS_PER_MILE / METERS_PER_KM)
}

/// Convert seconds per mile to seconds per kilometer
pub fn sec_per_mile_to_sec_per_km(seconds_per_mile: f64) -> f64 {
    seconds_per_mile * (METERS_PER_KM / METERS_PER_MILE)
}

/// Convert velocity in m/s to pace in seconds per kilometer
pub fn velocity_to_pace_per_km(velocity_ms: f64) -> f64 {
    METERS_PER_KM / velocity_ms
}

/// Convert velocity in m/s to pace in seconds per mile
pub fn velocity_to_pace_per_mile(velocity_ms: f64) -> f64 {
    METERS_PER_MILE / velocity_ms
}

/// Convert pace in seconds per kilometer to velocity in m/s
pub fn pace_per_km_to_velocity(seconds_per_km: f64) -> f64 {
    METERS_PER_KM / seconds_per_km
}

/// Convert pace in seconds per mile to velocity in m/s
pub fn pace_per_mile_to_velocity(seconds_per_mile: f64) -> f64 {
    METERS_PER_MILE / seconds_per_mile
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

pub fn km_to_meters(km: f64) -> f64 {
    km * METERS_PER_KM
}

/// Display unit system selected by the user
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Length of the pace reference distance in meters (1 km or 1 mile)
    pub fn pace_distance_m(self) -> f64 {
        match self {
            UnitSystem::Metric => METERS_PER_KM,
            UnitSystem::Imperial => METERS_PER_MILE,
        }
    }

    /// Pace in seconds per unit distance for a velocity in m/s
    pub fn pace_from_velocity(self, velocity_ms: f64) -> f64 {
        self.pace_distance_m() / velocity_ms
    }

    /// Velocity in m/s for a pace in seconds per unit distance
    pub fn velocity_from_pace(self, pace_seconds: f64) -> f64 {
        self.pace_distance_m() / pace_seconds
    }

    pub fn pace_suffix(self) -> &'static str {
        match self {
            UnitSystem::Metric => "/km",
            UnitSystem::Imperial => "/mi",
        }
    }

    pub fn distance_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "km",
            UnitSystem::Imperial => "mi",
        }
    }

    /// Distance in meters expressed in this system's display unit
    pub fn distance_from_meters(self, meters: f64) -> f64 {
        match self {
            UnitSystem::Metric => meters_to_km(meters),
            UnitSystem::Imperial => meters_to_miles(meters),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "metric"),
            UnitSystem::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "km" => Ok(UnitSystem::Metric),
            "imperial" | "mi" | "mile" | "miles" => Ok(UnitSystem::Imperial),
            other => Err(Error::Other(format!("Unknown unit system: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_velocity_to_pace() {
        assert!((velocity_to_pace_per_km(4.0) - 250.0).abs() < EPS);
        assert!((velocity_to_pace_per_mile(4.0) - 402.335).abs() < EPS);
    }

    #[test]
    fn test_km_pace_to_mile_pace_matches_direct_conversion() {
        let v = 3.1944;
        let via_km = sec_per_km_to_sec_per_mile(velocity_to_pace_per_km(v));
        let direct = velocity_to_pace_per_mile(v);
        assert!((via_km - direct).abs() < 1e-9);
    }

    #[test]
    fn test_distance_conversions() {
        assert!((meters_to_miles(1609.34) - 1.0).abs() < EPS);
        assert!((miles_to_meters(26.2) - 42164.708).abs() < 1e-6);
        assert!((meters_to_km(5000.0) - 5.0).abs() < EPS);
        assert!((km_to_meters(21.0975) - 21097.5).abs() < 1e-9);
        assert!((sec_per_mile_to_sec_per_km(sec_per_km_to_sec_per_mile(300.0)) - 300.0).abs() < EPS);
    }

    #[test]
    fn test_unit_system_parse_and_pace() {
        assert_eq!("metric".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!("furlongs".parse::<UnitSystem>().is_err());

        assert!((UnitSystem::Metric.pace_from_velocity(4.0) - 250.0).abs() < EPS);
        assert!((UnitSystem::Imperial.pace_from_velocity(4.0) - 402.335).abs() < EPS);
        assert_eq!(UnitSystem::Imperial.pace_suffix(), "/mi");
    }

    #[test]
    fn test_unit_system_distances() {
        assert!((UnitSystem::Metric.distance_from_meters(5000.0) - 5.0).abs() < EPS);
        assert!((UnitSystem::Imperial.distance_from_meters(METERS_PER_MILE) - 1.0).abs() < EPS);
        assert_eq!(UnitSystem::Metric.distance_label(), "km");
        assert_eq!(UnitSystem::Imperial.distance_label(), "mi");
    }

    #[test]
    fn test_invalid_velocity_is_not_finite() {
        assert!(velocity_to_pace_per_km(0.0).is_infinite());
        assert!(velocity_to_pace_per_km(f64::NAN).is_nan());
    }

    proptest! {
        #[test]
        fn prop_pace_velocity_roundtrip(v in 0.5f64..12.0) {
            let km = pace_per_km_to_velocity(velocity_to_pace_per_km(v));
            let mile = pace_per_mile_to_velocity(velocity_to_pace_per_mile(v));
            prop_assert!((km - v).abs() < 1e-9);
            prop_assert!((mile - v).abs() < 1e-9);
        }
    }
}
