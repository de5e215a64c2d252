//! Text search pipeline: option translation, backend execution and projection
pub mod mapper;
pub mod options;
mod projection;
pub mod results;
pub mod search;
pub mod service;

pub use mapper::{
    JsonStringMapper, MappingErrorPolicy, PropertyResultMapper, PropertyStringMapper,
    TextSearchRecord, TextSearchResultMapper, TextSearchStringMapper,
};
pub use options::{TextSearchFilter, TextSearchOptions};
pub use results::{KernelSearchResults, TextSearchResult};
pub use search::VectorStoreTextSearch;
pub use service::TextSearch;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
