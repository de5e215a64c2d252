//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// A required string was empty or whitespace
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Value {value} is out of range for {field} (expected {min}-{max})")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid tracing level '{level}' (expected trace, debug, info, warn or error)")]
    InvalidTracingLevel { level: String },

    /// Query vectors would never fit the store they are searched against
    #[error("Embedding dimension ({embedding}) must match vector storage dimension ({storage})")]
    DimensionMismatch { embedding: usize, storage: usize },

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
