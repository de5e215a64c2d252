//! Textsearch orchestration crate
//!
//! Turns a text query into a lazily paged search against a vector store and
//! projects each hit as a raw record, a normalized [`TextSearchResult`], or
//! a string. The query is embedded here when the store takes vectors, or
//! handed over as text when the store vectorizes it itself.

pub mod error;
pub mod searching;

// Re-export main types
pub use error::{SearchResult, TextSearchError, TextSearchErrorKind};
pub use searching::{
    JsonStringMapper, KernelSearchResults, MappingErrorPolicy, PropertyResultMapper,
    PropertyStringMapper, TextSearch, TextSearchFilter, TextSearchOptions, TextSearchRecord,
    TextSearchResult, TextSearchResultMapper, TextSearchStringMapper, VectorStoreTextSearch,
};

// Re-export test utilities when test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks {
    pub use crate::searching::test_utils::MockTextSearch;
}
