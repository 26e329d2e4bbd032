//! Error types for Vitals Forge

use thiserror::Error;

/// Errors that can occur while generating a record
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Observation window has no measurement days")]
    EmptyWindow,

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
