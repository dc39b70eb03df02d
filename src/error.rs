//! Error types for Scholia
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Scholia operations
///
/// Covers configuration problems, rejected attachments, failed generation
/// calls, and the I/O and serialization failures underneath them.
#[derive(Error, Debug)]
pub enum ScholiaError {
    /// Configuration-related errors (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A selected file is not an image
    #[error("Invalid attachment kind: {0}")]
    InvalidAttachmentKind(String),

    /// Any failure of the external generation call
    #[error("Generation error: {0}")]
    Generation(String),

    /// A request that should have been filtered before reaching the gateway
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScholiaError {
    /// Returns true for credential or configuration failures
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type alias for Scholia operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
