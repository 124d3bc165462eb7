//! Core domain types for the critical velocity calculator.
//!
//! This module defines the fundamental types used throughout the system:
//! - Test protocols and their raw inputs
//! - D' selection for single-effort tests
//! - CV results, zones, race predictions and curve samples
//! - Model parameters injected into the engines

use crate::units::{sec_per_km_to_sec_per_mile, velocity_to_pace_per_km, velocity_to_pace_per_mile};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Test Protocols
// ============================================================================

/// Single maximal effort of a fixed duration
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FixedDurationTest {
    /// Cooper 12-minute test
    Cooper12,
    ThirtyMinute,
    FortyFiveMinute,
    SixtyMinute,
}

impl FixedDurationTest {
    pub const ALL: [FixedDurationTest; 4] = [
        FixedDurationTest::Cooper12,
        FixedDurationTest::ThirtyMinute,
        FixedDurationTest::FortyFiveMinute,
        FixedDurationTest::SixtyMinute,
    ];

    pub fn duration_seconds(self) -> f64 {
        match self {
            FixedDurationTest::Cooper12 => 720.0,
            FixedDurationTest::ThirtyMinute => 1800.0,
            FixedDurationTest::FortyFiveMinute => 2700.0,
            FixedDurationTest::SixtyMinute => 3600.0,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            FixedDurationTest::Cooper12 => "cooper",
            FixedDurationTest::ThirtyMinute => "30min",
            FixedDurationTest::FortyFiveMinute => "45min",
            FixedDurationTest::SixtyMinute => "60min",
        }
    }
}

/// Test protocol used to derive CV
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "test", rename_all = "snake_case")]
pub enum TestProtocol {
    FixedDuration(FixedDurationTest),
    TwoPoint,
}

impl TestProtocol {
    pub fn id(self) -> &'static str {
        match self {
            TestProtocol::FixedDuration(test) => test.id(),
            TestProtocol::TwoPoint => "2point",
        }
    }
}

impl fmt::Display for TestProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TestProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cooper" | "12min" => Ok(TestProtocol::FixedDuration(FixedDurationTest::Cooper12)),
            "30min" => Ok(TestProtocol::FixedDuration(FixedDurationTest::ThirtyMinute)),
            "45min" => Ok(TestProtocol::FixedDuration(FixedDurationTest::FortyFiveMinute)),
            "60min" => Ok(TestProtocol::FixedDuration(FixedDurationTest::SixtyMinute)),
            "2point" | "two-point" => Ok(TestProtocol::TwoPoint),
            other => Err(Error::UnknownTest(other.to_string())),
        }
    }
}

/// Raw test results, tagged by protocol
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum TestInput {
    FixedDuration {
        test: FixedDurationTest,
        distance_m: f64,
    },
    TwoPoint {
        distance1: f64,
        time1: f64,
        distance2: f64,
        time2: f64,
    },
}

impl TestInput {
    pub fn protocol(&self) -> TestProtocol {
        match self {
            TestInput::FixedDuration { test, .. } => TestProtocol::FixedDuration(*test),
            TestInput::TwoPoint { .. } => TestProtocol::TwoPoint,
        }
    }
}

// ============================================================================
// D' Selection
// ============================================================================

/// Population-based D' presets for single-effort tests
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DPrimePreset {
    Conservative,
    Recreational,
    Standard,
    Trained,
    Elite,
}

impl DPrimePreset {
    pub const ALL: [DPrimePreset; 5] = [
        DPrimePreset::Conservative,
        DPrimePreset::Recreational,
        DPrimePreset::Standard,
        DPrimePreset::Trained,
        DPrimePreset::Elite,
    ];

    /// D' in meters
    pub fn meters(self) -> f64 {
        match self {
            DPrimePreset::Conservative => 150.0,
            DPrimePreset::Recreational => 200.0,
            DPrimePreset::Standard => 250.0,
            DPrimePreset::Trained => 300.0,
            DPrimePreset::Elite => 350.0,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            DPrimePreset::Conservative => "conservative",
            DPrimePreset::Recreational => "recreational",
            DPrimePreset::Standard => "standard",
            DPrimePreset::Trained => "trained",
            DPrimePreset::Elite => "elite",
        }
    }
}

impl FromStr for DPrimePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        DPrimePreset::ALL
            .into_iter()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| Error::UnknownPreset(s.to_string()))
    }
}

/// How D' is obtained for a single-effort test
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DPrimeChoice {
    /// The preset recommended for the test duration
    #[default]
    Recommended,
    Preset(DPrimePreset),
    /// User override in meters (clamped to the configured range)
    Custom(f64),
}

// ============================================================================
// Results
// ============================================================================

/// Which CV value downstream consumers should use
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CvMode {
    /// Unadjusted test velocity
    #[default]
    Raw,
    /// D'-compensated velocity
    Adjusted,
}

impl FromStr for CvMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" | "unadjusted" => Ok(CvMode::Raw),
            "adjusted" => Ok(CvMode::Adjusted),
            other => Err(Error::Other(format!("Unknown CV mode: {}", other))),
        }
    }
}

/// Output of the CV engine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CvResult {
    pub protocol: TestProtocol,
    pub velocity_ms: f64,
    pub velocity_ms_raw: f64,
    pub pace_sec_per_km: f64,
    pub pace_sec_per_km_raw: f64,
    pub d_prime: f64,
    pub d_prime_estimated: bool,
    pub adjusted_distance: f64,
}

impl CvResult {
    /// CV in m/s for the selected mode
    pub fn velocity(&self, mode: CvMode) -> f64 {
        match mode {
            CvMode::Raw => self.velocity_ms_raw,
            CvMode::Adjusted => self.velocity_ms,
        }
    }

    pub fn pace_sec_per_km(&self, mode: CvMode) -> f64 {
        match mode {
            CvMode::Raw => self.pace_sec_per_km_raw,
            CvMode::Adjusted => self.pace_sec_per_km,
        }
    }
}

/// One training-intensity band
///
/// `pace_min_*` is the faster end of the zone (smaller number of seconds),
/// `pace_max_*` the slower end.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Zone {
    pub number: u8,
    pub name: &'static str,
    pub velocity_min: f64,
    pub velocity_max: f64,
    pub pace_min_sec_per_km: f64,
    pub pace_max_sec_per_km: f64,
    pub pace_min_sec_per_mile: f64,
    pub pace_max_sec_per_mile: f64,
    /// Races whose predicted paces bound this zone (slower, faster)
    pub race_anchors: Option<(&'static str, &'static str)>,
}

impl Zone {
    /// Build a zone from its velocity bounds, deriving both pace units
    pub fn from_velocities(
        number: u8,
        name: &'static str,
        velocity_min: f64,
        velocity_max: f64,
        race_anchors: Option<(&'static str, &'static str)>,
    ) -> Self {
        Self {
            number,
            name,
            velocity_min,
            velocity_max,
            pace_min_sec_per_km: velocity_to_pace_per_km(velocity_max),
            pace_max_sec_per_km: velocity_to_pace_per_km(velocity_min),
            pace_min_sec_per_mile: velocity_to_pace_per_mile(velocity_max),
            pace_max_sec_per_mile: velocity_to_pace_per_mile(velocity_min),
            race_anchors,
        }
    }
}

/// Predicted finish for one race distance
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RacePrediction {
    pub distance_m: f64,
    pub time_seconds: f64,
    pub pace_sec_per_km: f64,
    pub pace_sec_per_mile: f64,
}

impl RacePrediction {
    pub fn from_time(distance_m: f64, time_seconds: f64) -> Self {
        let pace_sec_per_km = velocity_to_pace_per_km(distance_m / time_seconds);
        Self {
            distance_m,
            time_seconds,
            pace_sec_per_km,
            pace_sec_per_mile: sec_per_km_to_sec_per_mile(pace_sec_per_km),
        }
    }
}

/// Best estimate plus optional bounds from D' uncertainty
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RacePredictionRange {
    pub best: RacePrediction,
    /// Fastest plausible prediction (D' raised by the uncertainty)
    pub min: Option<RacePrediction>,
    /// Slowest plausible prediction (D' lowered by the uncertainty)
    pub max: Option<RacePrediction>,
    pub is_d_prime_estimated: bool,
}

/// A standard race distance
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RaceDistance {
    pub id: &'static str,
    pub name: &'static str,
    pub distance_m: f64,
    pub typical: bool,
}

/// Prediction for a race from the standard table
#[derive(Clone, Debug, Serialize)]
pub struct RaceResult {
    pub race: &'static RaceDistance,
    pub prediction: RacePredictionRange,
}

/// Sample of the velocity/duration curve
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub time_seconds: f64,
    pub distance_m: f64,
    pub velocity_ms: f64,
}

// ============================================================================
// Model Parameters
// ============================================================================

/// Tunable model constants, passed explicitly into the engines
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelParams {
    /// ± meters applied to an estimated D' for confidence bounds
    pub d_prime_uncertainty: f64,
    /// Riegel exponent
    pub riegel_fatigue_factor: f64,
    /// Duration of the hyperbolic reference effort for Riegel extrapolation
    pub riegel_reference_seconds: f64,
    pub d_prime_min: f64,
    pub d_prime_max: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            d_prime_uncertainty: 100.0,
            riegel_fatigue_factor: 1.06,
            riegel_reference_seconds: 1800.0,
            d_prime_min: 50.0,
            d_prime_max: 500.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!(
            "Cooper".parse::<TestProtocol>().unwrap(),
            TestProtocol::FixedDuration(FixedDurationTest::Cooper12)
        );
        assert_eq!("2point".parse::<TestProtocol>().unwrap(), TestProtocol::TwoPoint);
        assert!(matches!(
            "marathon".parse::<TestProtocol>(),
            Err(Error::UnknownTest(_))
        ));

        for test in FixedDurationTest::ALL {
            let protocol: TestProtocol = test.id().parse().unwrap();
            assert_eq!(protocol, TestProtocol::FixedDuration(test));
        }
    }

    #[test]
    fn test_presets_increase() {
        let meters: Vec<f64> = DPrimePreset::ALL.iter().map(|p| p.meters()).collect();
        assert!(meters.windows(2).all(|w| w[0] < w[1]));
        assert_eq!("elite".parse::<DPrimePreset>().unwrap(), DPrimePreset::Elite);
        assert!(matches!("pro".parse::<DPrimePreset>(), Err(Error::UnknownPreset(_))));
    }

    #[test]
    fn test_cv_mode_selects_velocity() {
        let result = CvResult {
            protocol: TestProtocol::FixedDuration(FixedDurationTest::ThirtyMinute),
            velocity_ms: 3.1944,
            velocity_ms_raw: 3.3333,
            pace_sec_per_km: 313.04,
            pace_sec_per_km_raw: 300.0,
            d_prime: 250.0,
            d_prime_estimated: true,
            adjusted_distance: 5750.0,
        };
        assert_eq!(result.velocity(CvMode::default()), 3.3333);
        assert_eq!(result.velocity(CvMode::Adjusted), 3.1944);
        assert_eq!(result.pace_sec_per_km(CvMode::Adjusted), 313.04);
        assert_eq!("adjusted".parse::<CvMode>().unwrap(), CvMode::Adjusted);
    }

    #[test]
    fn test_test_input_json_shape() {
        let input = TestInput::TwoPoint {
            distance1: 1500.0,
            time1: 360.0,
            distance2: 4200.0,
            time2: 1080.0,
        };
        let json = serde_json::to_value(input).unwrap();
        assert_eq!(json["protocol"], "two_point");
        assert_eq!(input.protocol(), TestProtocol::TwoPoint);

        let protocol = serde_json::to_value(TestProtocol::FixedDuration(FixedDurationTest::Cooper12)).unwrap();
        assert_eq!(protocol["type"], "fixed_duration");
        assert_eq!(protocol["test"], "cooper12");
    }

    #[test]
    fn test_zone_paces_follow_velocity() {
        let zone = Zone::from_velocities(3, "Tempo", 3.0, 4.0, None);
        assert_eq!(zone.pace_min_sec_per_km, 250.0);
        assert!((zone.pace_max_sec_per_km - 1000.0 / 3.0).abs() < 1e-9);
        assert!(zone.pace_min_sec_per_mile > zone.pace_min_sec_per_km);
    }

    #[test]
    fn test_race_prediction_mile_pace_uses_mile_constant() {
        let prediction = RacePrediction::from_time(5000.0, 1250.0);
        assert!((prediction.pace_sec_per_km - 250.0).abs() < 1e-9);
        let expected = crate::units::velocity_to_pace_per_mile(4.0);
        assert!((prediction.pace_sec_per_mile - expected).abs() < 1e-9);
    }
}
