//! Error types for the vcr_core library.

use std::io;

use crate::validation::ValidationReport;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vcr_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An engine received values that should have been rejected upstream
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Race-anchored zone boundaries were requested without a D' value
    #[error("D' is required for race prediction-based zones")]
    MissingDPrime,

    /// Zone system id did not match a known methodology
    #[error("Unknown zone system: {0}")]
    UnknownZoneSystem(String),

    /// Test protocol id did not match a known protocol
    #[error("Unknown test type: {0}")]
    UnknownTest(String),

    /// D' preset id did not match a known preset
    #[error("Unknown D' preset: {0}")]
    UnknownPreset(String),

    /// One or more input fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<ValidationReport> for Error {
    fn from(report: ValidationReport) -> Self {
        Error::Validation(report)
    }
}
