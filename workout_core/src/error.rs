//! Error types for the workout_core library.
//!
//! These cover the library surface (files, config, parsing). Failures of an
//! individual record migration are reported as data inside a
//! [`MigrationResult`](crate::MigrationResult), never as an `Err`.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record could not be converted to the target schema
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
