//! Textsearch vector data crate
//!
//! This crate defines the contract between the text-search pipeline and a
//! search backend: backend-native options and filters, the lazily paged
//! result stream, and the two search entry points a backend can offer
//! (search by vector, or search by text it vectorizes itself). It also ships
//! an in-memory store that honours the same paging contract, used for tests
//! and local development.

pub mod error;
pub mod storage;

// Re-export main types
pub use error::{VectorDataError, VectorDataResult};
pub use storage::{
    FilterClause, FilterClauseKind, InMemoryVectorStore, VectorSearchFilter,
    VectorSearchOptions, VectorSearchResult, VectorSearchResults, VectorSearchStream,
    VectorizableTextSearch, VectorizedSearch,
};
// Use unified configuration from textsearch-config
pub use textsearch_config::VectorStorageConfig;
