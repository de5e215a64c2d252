//! Error types for vector data operations

use textsearch_common::{CommonError, impl_common_conversions};
use thiserror::Error;

/// Result type alias for vector data operations
pub type VectorDataResult<T> = Result<T, VectorDataError>;

/// Errors that can occur while searching a backend
#[derive(Error, Debug)]
pub enum VectorDataError {
    /// Storage backend is unavailable or connection failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Vector dimension mismatch (e.g., query vector wrong size)
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    VectorDimensionMismatch { expected: usize, actual: usize },

    /// The backend cannot express the requested filter
    #[error("Filter not supported: {0}")]
    UnsupportedFilter(String),

    /// Storage backend specific error, typically raised while paging
    #[error("Storage error: {0}")]
    Storage(String),

    /// The backend failed to vectorize query text itself
    #[error("Vectorization failed: {0}")]
    Vectorization(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller cancelled the request
    #[error("Search cancelled: {0}")]
    Cancelled(String),

    /// Generic error for other issues
    #[error("Other error: {0}")]
    Other(String),
}

impl CommonError for VectorDataError {
    fn unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    fn config_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl_common_conversions!(VectorDataError);

impl From<serde_json::Error> for VectorDataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
