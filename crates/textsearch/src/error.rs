use textsearch_common::CorrelationId;
use thiserror::Error;

/// Text search errors
///
/// Configuration, query translation and embedding failures are raised when a
/// search is started, before any element is produced. Backend and mapping
/// failures can also arrive mid-stream, at the element whose pull failed;
/// elements yielded before them stay valid.
#[derive(Error, Debug)]
pub enum TextSearchError {
    /// A required capability is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The options cannot be expressed by the backend
    #[error("Query translation failed: {0}")]
    QueryTranslation(String),

    #[error("Embedding generation failed for query '{query}' (correlation: {correlation_id})")]
    Embedding {
        query: String,
        correlation_id: CorrelationId,
        #[source]
        source: textsearch_embeddings::EmbeddingError,
    },

    #[error("Search backend failed (correlation: {correlation_id}): {source}")]
    Backend {
        correlation_id: CorrelationId,
        #[source]
        source: textsearch_vector_data::VectorDataError,
    },

    /// Result `index` (zero-based, in backend order) could not be projected
    #[error("Failed to map search result {index}: {source}")]
    Mapping {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Discriminant of [`TextSearchError`] for callers that only need to branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSearchErrorKind {
    Configuration,
    QueryTranslation,
    Embedding,
    Backend,
    Mapping,
}

impl TextSearchError {
    pub const fn kind(&self) -> TextSearchErrorKind {
        match self {
            Self::Configuration(_) => TextSearchErrorKind::Configuration,
            Self::QueryTranslation(_) => TextSearchErrorKind::QueryTranslation,
            Self::Embedding { .. } => TextSearchErrorKind::Embedding,
            Self::Backend { .. } => TextSearchErrorKind::Backend,
            Self::Mapping { .. } => TextSearchErrorKind::Mapping,
        }
    }
}

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, TextSearchError>;
