//! Error types for Resilience Flux

use thiserror::Error;

/// Errors raised by the surfaces around the scoring core.
///
/// Classification, pairing and scoring themselves are total; these errors
/// only come from parsing input, loading configuration or encoding output.
#[derive(Debug, Error)]
pub enum ResilienceError {
    #[error("Failed to parse records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
