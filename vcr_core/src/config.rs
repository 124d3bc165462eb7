//! Configuration file support for VCR.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vcr/config.toml`.

use crate::types::{CvMode, ModelParams};
use crate::units::UnitSystem;
use crate::zones::ZoneSystem;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Documented range for the Riegel fatigue exponent
pub const RIEGEL_FACTOR_RANGE: (f64, f64) = (1.06, 1.08);

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub d_prime: DPrimeConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Prediction model constants
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_d_prime_uncertainty")]
    pub d_prime_uncertainty: f64,

    #[serde(default = "default_riegel_fatigue_factor")]
    pub riegel_fatigue_factor: f64,

    #[serde(default = "default_riegel_reference_seconds")]
    pub riegel_reference_seconds: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            d_prime_uncertainty: default_d_prime_uncertainty(),
            riegel_fatigue_factor: default_riegel_fatigue_factor(),
            riegel_reference_seconds: default_riegel_reference_seconds(),
        }
    }
}

/// Allowed range for a user-supplied D'
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DPrimeConfig {
    #[serde(default = "default_d_prime_min")]
    pub min: f64,

    #[serde(default = "default_d_prime_max")]
    pub max: f64,
}

impl Default for DPrimeConfig {
    fn default() -> Self {
        Self {
            min: default_d_prime_min(),
            max: default_d_prime_max(),
        }
    }
}

/// Output preferences for the CLI
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub units: UnitSystem,

    #[serde(default)]
    pub cv_mode: CvMode,

    #[serde(default)]
    pub zone_system: ZoneSystem,

    #[serde(default = "default_typical_races_only")]
    pub typical_races_only: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            cv_mode: CvMode::default(),
            zone_system: ZoneSystem::default(),
            typical_races_only: default_typical_races_only(),
        }
    }
}

// Default value functions
fn default_d_prime_uncertainty() -> f64 {
    ModelParams::default().d_prime_uncertainty
}

fn default_riegel_fatigue_factor() -> f64 {
    ModelParams::default().riegel_fatigue_factor
}

fn default_riegel_reference_seconds() -> f64 {
    ModelParams::default().riegel_reference_seconds
}

fn default_d_prime_min() -> f64 {
    ModelParams::default().d_prime_min
}

fn default_d_prime_max() -> f64 {
    ModelParams::default().d_prime_max
}

fn default_typical_races_only() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("vcr").join("config.toml")
    }

    /// Check the model constants for values the engines cannot use
    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        if !model.riegel_fatigue_factor.is_finite() || model.riegel_fatigue_factor <= 1.0 {
            return Err(Error::Config(format!(
                "riegel_fatigue_factor must be greater than 1.0, got {}",
                model.riegel_fatigue_factor
            )));
        }
        let (low, high) = RIEGEL_FACTOR_RANGE;
        if model.riegel_fatigue_factor < low || model.riegel_fatigue_factor > high {
            tracing::warn!(
                "riegel_fatigue_factor {} is outside the usual {}-{} range",
                model.riegel_fatigue_factor,
                low,
                high
            );
        }
        if !model.d_prime_uncertainty.is_finite() || model.d_prime_uncertainty <= 0.0 {
            return Err(Error::Config(format!(
                "d_prime_uncertainty must be positive, got {}",
                model.d_prime_uncertainty
            )));
        }
        if !model.riegel_reference_seconds.is_finite() || model.riegel_reference_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "riegel_reference_seconds must be positive, got {}",
                model.riegel_reference_seconds
            )));
        }
        if !(self.d_prime.min >= 0.0 && self.d_prime.min <= self.d_prime.max) {
            return Err(Error::Config(format!(
                "d_prime range {}-{} is invalid",
                self.d_prime.min, self.d_prime.max
            )));
        }
        Ok(())
    }

    /// Engine parameters derived from this configuration
    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            d_prime_uncertainty: self.model.d_prime_uncertainty,
            riegel_fatigue_factor: self.model.riegel_fatigue_factor,
            riegel_reference_seconds: self.model.riegel_reference_seconds,
            d_prime_min: self.d_prime.min,
            d_prime_max: self.d_prime.max,
        }
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.d_prime_uncertainty, 100.0);
        assert_eq!(config.model.riegel_fatigue_factor, 1.06);
        assert_eq!(config.d_prime.min, 50.0);
        assert_eq!(config.d_prime.max, 500.0);
        assert_eq!(config.display.zone_system, ZoneSystem::OffsetBased);
        assert!(config.display.typical_races_only);
        assert_eq!(config.model_params(), ModelParams::default());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.display.units = UnitSystem::Imperial;
        config.display.zone_system = ZoneSystem::RacePredictionBased;

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("race-prediction-based"));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[model]
riegel_fatigue_factor = 1.08

[display]
cv_mode = "adjusted"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.riegel_fatigue_factor, 1.08);
        assert_eq!(config.model.d_prime_uncertainty, 100.0); // default
        assert_eq!(config.display.cv_mode, CvMode::Adjusted);
        assert_eq!(config.display.units, UnitSystem::Metric);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.model.riegel_fatigue_factor = 1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.model.d_prime_uncertainty = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.d_prime.min = 600.0;
        assert!(config.validate().is_err());

        // Unusual but usable
        let mut config = Config::default();
        config.model.riegel_fatigue_factor = 1.15;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.d_prime.max = 450.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.d_prime.max, 450.0);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nriegel_fatigue_factor = 0.9\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[model\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }
}
