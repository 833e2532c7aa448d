//! Error types for the fuel_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fuel_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user metrics
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Food journal error
    #[error("Journal error: {0}")]
    Journal(String),

    /// Workout log error
    #[error("Workout error: {0}")]
    Workout(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
