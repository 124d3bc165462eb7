#![forbid(unsafe_code)]

//! Core domain model for the VCR critical velocity calculator.
//!
//! This crate provides:
//! - Domain types (test protocols, CV results, zones, race predictions)
//! - Input validation and plausibility checks
//! - CV/D' estimation for fixed-duration and two-point tests
//! - Training zones, race predictions and the velocity/duration curve
//! - Configuration and logging shared by the binaries

pub mod types;
pub mod error;
pub mod units;
pub mod catalog;
pub mod format;
pub mod validation;
pub mod engine;
pub mod prediction;
pub mod zones;
pub mod curve;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use units::UnitSystem;
pub use config::Config;
pub use engine::{calculate_cv, calculate_cv_fixed_duration, calculate_cv_two_point};
pub use prediction::{predict_all_races, predict_race_time, predict_race_time_with_confidence};
pub use zones::{calculate_training_zones, ZoneSystem};
pub use curve::{generate_hyperbolic_curve, HyperbolicCurve};
pub use validation::{FieldError, ValidationReport};
