//! Configuration error types.

use thiserror::Error;

/// Errors produced while parsing or validating gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field value is out of range or inconsistent with another field.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted path of the offending field.
        field: String,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The TOML document could not be deserialized.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
