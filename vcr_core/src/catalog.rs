//! Built-in configuration tables.
//!
//! Test protocol definitions, D' presets and the standard race distances.
//! All tables are immutable and shared across threads.

use crate::types::*;
use crate::validation::Bounds;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Default D' used when nothing better is known
pub const DEFAULT_D_PRIME: f64 = 250.0;

/// Description of a fixed-duration test protocol
#[derive(Clone, Debug)]
pub struct TestDefinition {
    pub test: FixedDurationTest,
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub distance_bounds: Bounds,
    pub recommended_preset: DPrimePreset,
    pub accuracy: &'static str,
}

/// Display metadata for a D' preset
#[derive(Clone, Debug)]
pub struct DPrimePresetInfo {
    pub preset: DPrimePreset,
    pub label: &'static str,
    pub description: &'static str,
}

static TEST_DEFINITIONS: Lazy<HashMap<FixedDurationTest, TestDefinition>> =
    Lazy::new(build_test_definitions);

static RACE_DISTANCES: Lazy<Vec<RaceDistance>> = Lazy::new(build_race_distances);

static D_PRIME_PRESETS: Lazy<Vec<DPrimePresetInfo>> = Lazy::new(build_d_prime_presets);

/// Get the definition for a fixed-duration test
pub fn test_definition(test: FixedDurationTest) -> &'static TestDefinition {
    // Every variant is inserted by build_test_definitions
    &TEST_DEFINITIONS[&test]
}

/// Standard race distances, shortest first by table order
///
/// With `typical_only` the list is restricted to commonly raced distances.
pub fn race_distances(typical_only: bool) -> Vec<&'static RaceDistance> {
    RACE_DISTANCES
        .iter()
        .filter(|race| !typical_only || race.typical)
        .collect()
}

/// Look up a race distance by id ("5k", "half", ...)
pub fn race_distance(id: &str) -> Option<&'static RaceDistance> {
    RACE_DISTANCES.iter().find(|race| race.id == id)
}

pub fn d_prime_presets() -> &'static [DPrimePresetInfo] {
    &D_PRIME_PRESETS
}

fn build_test_definitions() -> HashMap<FixedDurationTest, TestDefinition> {
    let mut defs = HashMap::new();

    defs.insert(
        FixedDurationTest::Cooper12,
        TestDefinition {
            test: FixedDurationTest::Cooper12,
            name: "Cooper 12-Minute Test",
            short_name: "Cooper",
            description: "Run maximum distance in exactly 12 minutes",
            distance_bounds: Bounds::new(500.0, 6000.0),
            recommended_preset: DPrimePreset::Trained,
            accuracy: "Moderate (overestimates CV due to shorter duration)",
        },
    );

    defs.insert(
        FixedDurationTest::ThirtyMinute,
        TestDefinition {
            test: FixedDurationTest::ThirtyMinute,
            name: "30-Minutes Test",
            short_name: "30min",
            description: "Run maximum distance in exactly 30 minutes",
            distance_bounds: Bounds::new(1000.0, 12000.0),
            recommended_preset: DPrimePreset::Standard,
            accuracy: "High (direct approximation of CV)",
        },
    );

    defs.insert(
        FixedDurationTest::FortyFiveMinute,
        TestDefinition {
            test: FixedDurationTest::FortyFiveMinute,
            name: "45-Minutes Test",
            short_name: "45min",
            description: "Run maximum distance in exactly 45 minutes",
            distance_bounds: Bounds::new(1500.0, 18000.0),
            recommended_preset: DPrimePreset::Recreational,
            accuracy: "High (small anaerobic contribution)",
        },
    );

    defs.insert(
        FixedDurationTest::SixtyMinute,
        TestDefinition {
            test: FixedDurationTest::SixtyMinute,
            name: "60-Minutes Test",
            short_name: "60min",
            description: "Run maximum distance in exactly 60 minutes",
            distance_bounds: Bounds::new(2000.0, 24000.0),
            recommended_preset: DPrimePreset::Conservative,
            accuracy: "High (may underestimate CV for less durable runners)",
        },
    );

    defs
}

fn build_race_distances() -> Vec<RaceDistance> {
    vec![
        RaceDistance {
            id: "mile",
            name: "Mile",
            distance_m: 1609.34,
            typical: true,
        },
        RaceDistance {
            id: "1500m",
            name: "1500m",
            distance_m: 1500.0,
            typical: true,
        },
        RaceDistance {
            id: "3k",
            name: "3K",
            distance_m: 3000.0,
            typical: false,
        },
        RaceDistance {
            id: "5k",
            name: "5K",
            distance_m: 5000.0,
            typical: true,
        },
        RaceDistance {
            id: "10k",
            name: "10K",
            distance_m: 10000.0,
            typical: true,
        },
        RaceDistance {
            id: "15k",
            name: "15K",
            distance_m: 15000.0,
            typical: false,
        },
        RaceDistance {
            id: "half",
            name: "Half Marathon",
            distance_m: 21097.5,
            typical: true,
        },
        RaceDistance {
            id: "marathon",
            name: "Marathon",
            distance_m: 42195.0,
            typical: true,
        },
    ]
}

fn build_d_prime_presets() -> Vec<DPrimePresetInfo> {
    vec![
        DPrimePresetInfo {
            preset: DPrimePreset::Conservative,
            label: "Conservative (150m)",
            description: "Long tests or strongly aerobic runners",
        },
        DPrimePresetInfo {
            preset: DPrimePreset::Recreational,
            label: "Recreational (200m)",
            description: "Newer or mostly easy-paced runners",
        },
        DPrimePresetInfo {
            preset: DPrimePreset::Standard,
            label: "Standard (250m)",
            description: "Middle-ground population estimate",
        },
        DPrimePresetInfo {
            preset: DPrimePreset::Trained,
            label: "Trained (300m)",
            description: "Regular interval and race training",
        },
        DPrimePresetInfo {
            preset: DPrimePreset::Elite,
            label: "Elite (350m)",
            description: "Middle-distance specialists",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fixed_test_has_definition() {
        for test in FixedDurationTest::ALL {
            let def = test_definition(test);
            assert_eq!(def.test, test);
            assert!(def.distance_bounds.min < def.distance_bounds.max);
        }
    }

    #[test]
    fn test_recommended_d_prime_decreases_with_duration() {
        let mut previous = f64::INFINITY;
        for test in FixedDurationTest::ALL {
            let recommended = test_definition(test).recommended_preset.meters();
            assert!(recommended < previous, "{:?} should recommend a lower D'", test);
            previous = recommended;
        }
    }

    #[test]
    fn test_typical_race_filter() {
        let typical = race_distances(true);
        let all = race_distances(false);

        assert_eq!(all.len(), 8);
        assert_eq!(typical.len(), 6);
        assert!(typical.iter().all(|r| r.typical));
        assert!(race_distance("3k").is_some());
        assert!(race_distance("ultra").is_none());
    }

    #[test]
    fn test_presets_cover_all_variants() {
        let presets = d_prime_presets();
        assert_eq!(presets.len(), DPrimePreset::ALL.len());
        for (info, preset) in presets.iter().zip(DPrimePreset::ALL) {
            assert_eq!(info.preset, preset);
        }
    }
}
