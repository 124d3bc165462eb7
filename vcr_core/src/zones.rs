//! Training zone engine.
//!
//! Each zone system is a fixed table of five zones whose edges are
//! [`BoundRule`]s. A single resolver turns every rule into a velocity, so
//! adding a methodology means adding a table, not a code path.

use crate::prediction::predict_race_time_riegel;
use crate::types::{ModelParams, Zone};
use crate::units::METERS_PER_KM;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How one edge of a zone is derived from CV
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundRule {
    /// Fraction of CV
    Percentage(f64),
    /// Seconds per km added to CV pace (negative is faster)
    FixedTimeOffset(f64),
    /// Riegel-predicted pace for a race distance
    RaceAnchor {
        distance_m: f64,
        label: &'static str,
    },
}

impl BoundRule {
    fn race_label(&self) -> Option<&'static str> {
        match self {
            BoundRule::RaceAnchor { label, .. } => Some(*label),
            _ => None,
        }
    }
}

/// One row of a zone system table; `lower` is the slower edge
#[derive(Clone, Copy, Debug)]
pub struct ZoneDefinition {
    pub number: u8,
    pub name: &'static str,
    pub lower: BoundRule,
    pub upper: BoundRule,
}

impl ZoneDefinition {
    /// Race names when both edges are race anchors (slower, faster)
    pub fn race_anchors(&self) -> Option<(&'static str, &'static str)> {
        Some((self.lower.race_label()?, self.upper.race_label()?))
    }
}

const fn zone(number: u8, name: &'static str, lower: BoundRule, upper: BoundRule) -> ZoneDefinition {
    ZoneDefinition {
        number,
        name,
        lower,
        upper,
    }
}

const fn race(distance_m: f64, label: &'static str) -> BoundRule {
    BoundRule::RaceAnchor { distance_m, label }
}

use BoundRule::{FixedTimeOffset, Percentage};

static OFFSET_BASED: [ZoneDefinition; 5] = [
    zone(1, "Recovery / Easy", Percentage(0.70), Percentage(0.85)),
    zone(2, "Steady State", Percentage(0.85), Percentage(0.90)),
    zone(3, "Tempo", Percentage(0.90), Percentage(0.97)),
    zone(4, "Threshold", Percentage(0.97), FixedTimeOffset(-10.0)),
    zone(5, "VO₂ Max", FixedTimeOffset(-10.0), FixedTimeOffset(-20.0)),
];

static RACE_PREDICTION_BASED: [ZoneDefinition; 5] = [
    zone(1, "Recovery / Easy", Percentage(0.70), Percentage(0.85)),
    zone(2, "Steady State", Percentage(0.85), Percentage(0.90)),
    zone(3, "Tempo", Percentage(0.90), Percentage(0.97)),
    zone(4, "Threshold", race(10000.0, "10K"), race(5000.0, "5K")),
    zone(5, "VO₂ Max", race(3000.0, "3K"), race(1500.0, "1500m")),
];

/// Zone boundary methodology
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneSystem {
    /// Percentages of CV, then fixed pace offsets above threshold
    #[default]
    OffsetBased,
    /// Percentages of CV, then race-equivalent paces above threshold
    RacePredictionBased,
}

impl ZoneSystem {
    pub const ALL: [ZoneSystem; 2] = [ZoneSystem::OffsetBased, ZoneSystem::RacePredictionBased];

    pub fn id(self) -> &'static str {
        match self {
            ZoneSystem::OffsetBased => "offset-based",
            ZoneSystem::RacePredictionBased => "race-prediction-based",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ZoneSystem::OffsetBased => "Offset-Based",
            ZoneSystem::RacePredictionBased => "Race Prediction-Based",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ZoneSystem::OffsetBased => {
                "Zones 4-5 use fixed pace offsets from CV (10 and 20 s/km faster)"
            }
            ZoneSystem::RacePredictionBased => {
                "Zones 4-5 are anchored to predicted 10K, 5K, 3K and 1500m paces"
            }
        }
    }

    pub fn definitions(self) -> &'static [ZoneDefinition; 5] {
        match self {
            ZoneSystem::OffsetBased => &OFFSET_BASED,
            ZoneSystem::RacePredictionBased => &RACE_PREDICTION_BASED,
        }
    }

    /// Whether any boundary needs D'
    pub fn requires_d_prime(self) -> bool {
        self.definitions()
            .iter()
            .any(|def| def.race_anchors().is_some())
    }
}

impl fmt::Display for ZoneSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ZoneSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        ZoneSystem::ALL
            .into_iter()
            .find(|system| system.id() == wanted)
            .ok_or_else(|| Error::UnknownZoneSystem(s.to_string()))
    }
}

fn resolve_bound(
    rule: BoundRule,
    critical_speed: f64,
    d_prime: Option<f64>,
    params: &ModelParams,
) -> Result<f64> {
    match rule {
        Percentage(fraction) => Ok(critical_speed * fraction),
        FixedTimeOffset(seconds) => {
            // Offsets live in the pace domain
            let pace = METERS_PER_KM / critical_speed + seconds;
            if pace <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "Pace offset {}s/km is not valid for CV {} m/s",
                    seconds, critical_speed
                )));
            }
            Ok(METERS_PER_KM / pace)
        }
        BoundRule::RaceAnchor { distance_m, .. } => {
            let d_prime = d_prime.ok_or(Error::MissingDPrime)?;
            let prediction = predict_race_time_riegel(
                critical_speed,
                d_prime,
                distance_m,
                params.riegel_fatigue_factor,
                params.riegel_reference_seconds,
            )?;
            Ok(distance_m / prediction.time_seconds)
        }
    }
}

/// Calculate the five training zones for a CV (m/s)
///
/// `d_prime` is only consulted by race-anchored boundaries, which fail with
/// [`Error::MissingDPrime`] when it is absent.
pub fn calculate_training_zones(
    critical_speed: f64,
    system: ZoneSystem,
    d_prime: Option<f64>,
    params: &ModelParams,
) -> Result<[Zone; 5]> {
    if !critical_speed.is_finite() || critical_speed <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Critical speed must be positive, got {}",
            critical_speed
        )));
    }
    if let Some(d) = d_prime {
        if !d.is_finite() || d < 0.0 {
            return Err(Error::InvalidInput(format!("D' must be non-negative, got {}", d)));
        }
    }

    let definitions = system.definitions();
    let mut bounds = [(0.0, 0.0); 5];
    for (slot, def) in bounds.iter_mut().zip(definitions.iter()) {
        *slot = (
            resolve_bound(def.lower, critical_speed, d_prime, params)?,
            resolve_bound(def.upper, critical_speed, d_prime, params)?,
        );
    }

    // Zones must never overlap their faster neighbour; walk down from the
    // top so a lowered edge propagates
    for i in (0..bounds.len() - 1).rev() {
        let next_lower = bounds[i + 1].0;
        if bounds[i].1 > next_lower {
            tracing::debug!(
                "Zone {} upper bound {:.4} m/s clamped to zone {} lower bound {:.4} m/s",
                i + 1,
                bounds[i].1,
                i + 2,
                next_lower
            );
            bounds[i].1 = next_lower;
            bounds[i].0 = bounds[i].0.min(next_lower);
        }
    }

    tracing::debug!("{} zones for CV {:.4} m/s", system.id(), critical_speed);

    Ok(std::array::from_fn(|i| {
        let def = &definitions[i];
        Zone::from_velocities(def.number, def.name, bounds[i].0, bounds[i].1, def.race_anchors())
    }))
}

/// Single zone from the default system
pub fn training_zone(critical_speed: f64, number: u8) -> Result<Zone> {
    if !(1..=5).contains(&number) {
        return Err(Error::InvalidInput(format!(
            "Zone number must be between 1 and 5, got {}",
            number
        )));
    }
    let zones = calculate_training_zones(
        critical_speed,
        ZoneSystem::default(),
        None,
        &ModelParams::default(),
    )?;
    let [z1, z2, z3, z4, z5] = zones;
    Ok(match number {
        1 => z1,
        2 => z2,
        3 => z3,
        4 => z4,
        _ => z5,
    })
}
