//! Textsearch embedding crate
//!
//! Defines the capability the search pipeline uses to turn query text into a
//! vector. Concrete generators (remote APIs, local models) live with whoever
//! wires up a deployment; this crate only owns the contract and its errors.

pub mod embedding;
pub mod error;

// Re-export main types
pub use embedding::EmbeddingGenerator;
pub use error::{EmbeddingError, EmbeddingResult};
// EmbeddingConfig comes from textsearch-config to keep one source of truth
pub use textsearch_config::EmbeddingConfig;

// Re-export test utilities when test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks {
    pub use crate::embedding::mock::MockEmbeddingGenerator;
}
