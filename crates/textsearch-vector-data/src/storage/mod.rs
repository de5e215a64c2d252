pub mod filter;
pub mod memory;
pub mod traits;

pub use self::filter::{FilterClause, FilterClauseKind, VectorSearchFilter};
pub use self::memory::InMemoryVectorStore;
pub use self::traits::{
    VectorSearchOptions, VectorSearchResult, VectorSearchResults, VectorSearchStream,
    VectorizableTextSearch, VectorizedSearch,
};
