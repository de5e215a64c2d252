//! Search backend abstraction traits
//!
//! A backend hands back a [`VectorSearchResults`] whose `results` stream is
//! lazy: nothing beyond the first page request happens until the consumer
//! polls, and page `N + 1` is not requested until page `N` has been drained.

use super::filter::{FilterClauseKind, VectorSearchFilter};
use crate::VectorDataResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;
use textsearch_common::CorrelationId;
use tokio_util::sync::CancellationToken;

/// Backend-native search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchOptions {
    /// Maximum number of records to return
    pub top: usize,
    /// Number of ranked records to skip before the first returned one
    pub skip: usize,
    /// Conjunctive filter, if any
    pub filter: Option<VectorSearchFilter>,
    /// Whether the backend should report an exact total count
    pub include_total_count: bool,
}

impl Default for VectorSearchOptions {
    fn default() -> Self {
        Self {
            top: 3,
            skip: 0,
            filter: None,
            include_total_count: false,
        }
    }
}

/// One ranked record
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchResult<R> {
    pub record: R,
    /// Relevance score, when the backend reports one
    pub score: Option<f64>,
}

/// Lazily paged stream of ranked records
pub type VectorSearchStream<R> = BoxStream<'static, VectorDataResult<VectorSearchResult<R>>>;

/// What a backend returns for one search call
pub struct VectorSearchResults<R> {
    /// Ranked records in backend order
    pub results: VectorSearchStream<R>,
    /// Exact match count, only when cheaply available and requested
    pub total_count: Option<u64>,
    /// Backend-specific diagnostics, passed through to the caller untouched
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<R> VectorSearchResults<R> {
    pub fn new(results: VectorSearchStream<R>) -> Self {
        Self {
            results,
            total_count: None,
            metadata: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn with_total_count(mut self, total_count: Option<u64>) -> Self {
        self.total_count = total_count;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl<R> std::fmt::Debug for VectorSearchResults<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearchResults")
            .field("total_count", &self.total_count)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// A backend that searches by a caller-supplied vector
///
/// Implementations must be safe to call concurrently; every call gets its own
/// independent result stream.
#[async_trait]
pub trait VectorizedSearch<R: Send + 'static>: Send + Sync {
    /// Start a similarity search for `vector`
    ///
    /// Only the first page request happens before this returns; later pages
    /// are fetched as the returned stream is polled. The stream must end
    /// (rather than yield more records) once `cancellation` fires.
    async fn vectorized_search(
        &self,
        vector: Vec<f32>,
        options: &VectorSearchOptions,
        cancellation: &CancellationToken,
        correlation_id: &CorrelationId,
    ) -> VectorDataResult<VectorSearchResults<R>>;

    /// Filter clause kinds this backend translates natively
    fn supported_filter_clauses(&self) -> &[FilterClauseKind] {
        &[]
    }

    /// Length of the query vectors this backend accepts, when known up front
    fn vector_dimension(&self) -> Option<usize> {
        None
    }
}

/// A backend that vectorizes query text itself
#[async_trait]
pub trait VectorizableTextSearch<R: Send + 'static>: Send + Sync {
    /// Start a similarity search for `text`
    ///
    /// Same laziness and cancellation rules as
    /// [`VectorizedSearch::vectorized_search`].
    async fn vectorizable_text_search(
        &self,
        text: &str,
        options: &VectorSearchOptions,
        cancellation: &CancellationToken,
        correlation_id: &CorrelationId,
    ) -> VectorDataResult<VectorSearchResults<R>>;

    /// Filter clause kinds this backend translates natively
    fn supported_filter_clauses(&self) -> &[FilterClauseKind] {
        &[]
    }
}
