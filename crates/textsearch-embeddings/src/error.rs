//! Error types for the textsearch-embeddings crate

use textsearch_common::{CommonError, impl_common_conversions};
use thiserror::Error;

/// Result type alias for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors raised while generating a query embedding
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Configuration and environment errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model or service rejected the input or failed to produce a vector
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// The embedding service could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The produced vector does not have the configured dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The caller cancelled the request
    #[error("Embedding cancelled: {0}")]
    Cancelled(String),

    /// Generic error for other cases
    #[error("Other error: {0}")]
    Other(String),
}

impl EmbeddingError {
    /// Create an embedding generation error
    pub fn generation_error(msg: &str) -> Self {
        Self::Embedding(msg.to_string())
    }

    /// Whether this error came from cancellation rather than a failure
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl CommonError for EmbeddingError {
    fn unavailable(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl_common_conversions!(EmbeddingError);
