//! In-memory vector store
//!
//! Keeps records in a process-local table and serves searches with the same
//! lazy paging contract a remote backend has: ranking happens when the search
//! starts, but records are cloned out one page at a time as the result stream
//! is polled. Useful for tests and local development without a real vector
//! database.

use super::filter::{FilterClauseKind, VectorSearchFilter};
use super::traits::{
    VectorSearchOptions, VectorSearchResult, VectorSearchResults, VectorizableTextSearch,
    VectorizedSearch,
};
use crate::{VectorDataError, VectorDataResult, VectorStorageConfig};
use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use textsearch_common::{CommonError, CorrelationId};
use textsearch_embeddings::EmbeddingGenerator;
use tokio_util::sync::CancellationToken;

const DEFAULT_PAGE_SIZE: usize = 100;
const SUPPORTED_FILTER_CLAUSES: &[FilterClauseKind] =
    &[FilterClauseKind::EqualTo, FilterClauseKind::AnyTagEqualTo];

/// Record with its key, vector and a JSON view used for filtering
struct StoredRecord<R> {
    key: String,
    vector: Vec<f32>,
    fields: serde_json::Value,
    record: R,
}

// Type aliases to simplify complex types
type RecordTable<R> = Arc<RwLock<Vec<Arc<StoredRecord<R>>>>>;
type Ranked<R> = Vec<(Arc<StoredRecord<R>>, f64)>;

#[derive(Default)]
struct StoreCounters {
    searches: AtomicUsize,
    page_fetches: AtomicUsize,
}

/// Process-local vector store
pub struct InMemoryVectorStore<R> {
    collection_name: String,
    dimension: usize,
    page_size: usize,
    records: RecordTable<R>,
    counters: Arc<StoreCounters>,
    embedding_generator: Option<Arc<dyn EmbeddingGenerator>>,
    report_total_count: bool,
    fail_on_search: bool,
    fail_on_page: Option<usize>,
}

impl<R> Clone for InMemoryVectorStore<R> {
    fn clone(&self) -> Self {
        Self {
            collection_name: self.collection_name.clone(),
            dimension: self.dimension,
            page_size: self.page_size,
            records: Arc::clone(&self.records),
            counters: Arc::clone(&self.counters),
            embedding_generator: self.embedding_generator.clone(),
            report_total_count: self.report_total_count,
            fail_on_search: self.fail_on_search,
            fail_on_page: self.fail_on_page,
        }
    }
}

impl<R> InMemoryVectorStore<R>
where
    R: Clone + Serialize + Send + Sync + 'static,
{
    /// Create an empty store for vectors of `dimension` elements
    pub fn new(collection_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            collection_name: collection_name.into(),
            dimension,
            page_size: DEFAULT_PAGE_SIZE,
            records: Arc::new(RwLock::new(Vec::new())),
            counters: Arc::new(StoreCounters::default()),
            embedding_generator: None,
            report_total_count: true,
            fail_on_search: false,
            fail_on_page: None,
        }
    }

    /// Create an empty store from the shared vector storage configuration
    pub fn from_config(config: &VectorStorageConfig) -> Self {
        Self::new(config.collection_name.clone(), config.vector_dimension)
            .with_page_size(config.page_size)
    }

    /// Number of records handed out per page fetch (minimum 1)
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Let the store vectorize query text itself
    #[must_use]
    pub fn with_embedding_generator(mut self, generator: Arc<dyn EmbeddingGenerator>) -> Self {
        self.embedding_generator = Some(generator);
        self
    }

    /// Never report a total count, like backends where counting is expensive
    #[must_use]
    pub const fn without_total_count(mut self) -> Self {
        self.report_total_count = false;
        self
    }

    /// Configure to fail when a search is started (for testing error handling)
    #[must_use]
    pub const fn with_search_failure(mut self) -> Self {
        self.fail_on_search = true;
        self
    }

    /// Configure the zero-based page `page_index` to fail while paging
    #[must_use]
    pub const fn with_page_failure(mut self, page_index: usize) -> Self {
        self.fail_on_page = Some(page_index);
        self
    }

    /// Insert a record, replacing any record stored under the same key
    ///
    /// A replaced record keeps its original position, which is the tie-break
    /// order for equal scores.
    ///
    /// # Errors
    /// Returns `VectorDimensionMismatch` for a wrong-sized vector and
    /// `Serialization` if the record cannot be rendered for filtering
    pub fn upsert(
        &self,
        key: impl Into<String>,
        vector: Vec<f32>,
        record: R,
    ) -> VectorDataResult<()> {
        if vector.len() != self.dimension {
            return Err(VectorDataError::VectorDimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let stored = Arc::new(StoredRecord {
            key: key.into(),
            fields: serde_json::to_value(&record)?,
            vector,
            record,
        });

        let mut records = self.write_table()?;
        if let Some(slot) = records.iter_mut().find(|existing| existing.key == stored.key) {
            *slot = stored;
        } else {
            records.push(stored);
        }
        Ok(())
    }

    /// Fetch a record by key
    pub fn get(&self, key: &str) -> Option<R> {
        self.records.read().ok().and_then(|records| {
            records
                .iter()
                .find(|stored| stored.key == key)
                .map(|stored| stored.record.clone())
        })
    }

    /// Remove a record by key, returning whether it existed
    ///
    /// # Errors
    /// Returns `Storage` if the record table lock is poisoned
    pub fn delete(&self, key: &str) -> VectorDataResult<bool> {
        let mut records = self.write_table()?;
        let before = records.len();
        records.retain(|stored| stored.key != key);
        Ok(records.len() != before)
    }

    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of searches started against this store (shared across clones)
    pub fn search_count(&self) -> usize {
        self.counters.searches.load(Ordering::SeqCst)
    }

    /// Number of pages fetched across all searches (shared across clones)
    pub fn page_fetch_count(&self) -> usize {
        self.counters.page_fetches.load(Ordering::SeqCst)
    }

    fn write_table(
        &self,
    ) -> VectorDataResult<std::sync::RwLockWriteGuard<'_, Vec<Arc<StoredRecord<R>>>>> {
        self.records
            .write()
            .map_err(|_| VectorDataError::Storage("record table lock poisoned".to_string()))
    }

    /// Score every record passing the filter, best first
    fn rank(
        &self,
        query: &[f32],
        filter: Option<&VectorSearchFilter>,
    ) -> VectorDataResult<Ranked<R>> {
        let records = self
            .records
            .read()
            .map_err(|_| VectorDataError::Storage("record table lock poisoned".to_string()))?;

        let mut ranked: Ranked<R> = records
            .iter()
            .filter(|stored| filter.is_none_or(|f| f.matches(&stored.fields)))
            .map(|stored| (Arc::clone(stored), cosine_similarity(query, &stored.vector)))
            .collect();

        // Stable sort keeps insertion order for equal scores
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }

    fn search_by_vector(
        &self,
        vector: &[f32],
        options: &VectorSearchOptions,
        cancellation: &CancellationToken,
        correlation_id: &CorrelationId,
    ) -> VectorDataResult<VectorSearchResults<R>> {
        self.counters.searches.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            correlation_id = %correlation_id,
            collection = %self.collection_name,
            top = options.top,
            skip = options.skip,
            filtered = options.filter.is_some(),
            "In-memory vector search"
        );

        if self.fail_on_search {
            return Err(VectorDataError::unavailable(format!(
                "collection '{}' configured to fail",
                self.collection_name
            )));
        }
        if vector.len() != self.dimension {
            return Err(VectorDataError::VectorDimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let scanned = self.len();
        let ranked = self.rank(vector, options.filter.as_ref())?;
        let total_count = (options.include_total_count && self.report_total_count)
            .then(|| u64::try_from(ranked.len()).ok())
            .flatten();

        let window: Ranked<R> = ranked
            .into_iter()
            .skip(options.skip)
            .take(options.top)
            .collect();

        let cursor = PageCursor {
            remaining: window.into_iter(),
            page_size: self.page_size,
            next_page: 0,
            fail_on_page: self.fail_on_page,
            counters: Arc::clone(&self.counters),
            cancellation: cancellation.clone(),
            correlation_id: correlation_id.clone(),
            done: false,
        };

        Ok(VectorSearchResults::new(cursor.into_stream())
            .with_total_count(total_count)
            .with_metadata("scanned_count", serde_json::Value::from(scanned)))
    }
}

/// Hands out the ranked window one page per fetch
struct PageCursor<R> {
    remaining: std::vec::IntoIter<(Arc<StoredRecord<R>>, f64)>,
    page_size: usize,
    next_page: usize,
    fail_on_page: Option<usize>,
    counters: Arc<StoreCounters>,
    cancellation: CancellationToken,
    correlation_id: CorrelationId,
    done: bool,
}

impl<R> PageCursor<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn into_stream(self) -> super::traits::VectorSearchStream<R> {
        stream::unfold(self, |mut cursor| async move {
            if cursor.done || cursor.remaining.len() == 0 {
                return None;
            }
            if cursor.cancellation.is_cancelled() {
                tracing::debug!(
                    correlation_id = %cursor.correlation_id,
                    page = cursor.next_page,
                    "Paging stopped by cancellation"
                );
                return None;
            }

            // One round trip per page
            tokio::task::yield_now().await;
            cursor.counters.page_fetches.fetch_add(1, Ordering::SeqCst);

            let page_index = cursor.next_page;
            cursor.next_page = cursor.next_page.saturating_add(1);

            if cursor.fail_on_page == Some(page_index) {
                cursor.done = true;
                return Some((
                    Err(VectorDataError::Storage(format!(
                        "page {page_index} fetch failed"
                    ))),
                    cursor,
                ));
            }

            let page: Vec<VectorDataResult<VectorSearchResult<R>>> = cursor
                .remaining
                .by_ref()
                .take(cursor.page_size)
                .map(|(stored, score)| {
                    Ok(VectorSearchResult {
                        record: stored.record.clone(),
                        score: Some(score),
                    })
                })
                .collect();

            tracing::trace!(
                correlation_id = %cursor.correlation_id,
                page = page_index,
                records = page.len(),
                "Fetched page"
            );
            Some((Ok(page), cursor))
        })
        .flat_map(|page| match page {
            Ok(records) => stream::iter(records).left_stream(),
            Err(e) => stream::once(future::ready(Err(e))).right_stream(),
        })
        .boxed()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (x.mul_add(y, dot), x.mul_add(x, na), y.mul_add(y, nb))
        },
    );
    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

#[async_trait]
impl<R> VectorizedSearch<R> for InMemoryVectorStore<R>
where
    R: Clone + Serialize + Send + Sync + 'static,
{
    async fn vectorized_search(
        &self,
        vector: Vec<f32>,
        options: &VectorSearchOptions,
        cancellation: &CancellationToken,
        correlation_id: &CorrelationId,
    ) -> VectorDataResult<VectorSearchResults<R>> {
        self.search_by_vector(&vector, options, cancellation, correlation_id)
    }

    fn supported_filter_clauses(&self) -> &[FilterClauseKind] {
        SUPPORTED_FILTER_CLAUSES
    }

    fn vector_dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }
}

#[async_trait]
impl<R> VectorizableTextSearch<R> for InMemoryVectorStore<R>
where
    R: Clone + Serialize + Send + Sync + 'static,
{
    async fn vectorizable_text_search(
        &self,
        text: &str,
        options: &VectorSearchOptions,
        cancellation: &CancellationToken,
        correlation_id: &CorrelationId,
    ) -> VectorDataResult<VectorSearchResults<R>> {
        let generator = self.embedding_generator.as_ref().ok_or_else(|| {
            VectorDataError::config_error(format!(
                "collection '{}' has no embedding generator for text search",
                self.collection_name
            ))
        })?;
        if generator.embedding_dimension() != self.dimension {
            return Err(VectorDataError::config_error(format!(
                "embedding model '{}' produces {} dimensions but collection '{}' stores {}",
                generator.model_name(),
                generator.embedding_dimension(),
                self.collection_name,
                self.dimension
            )));
        }

        let vector = generator
            .generate_embedding(text, cancellation)
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    VectorDataError::cancelled(e.to_string())
                } else {
                    VectorDataError::Vectorization(e.to_string())
                }
            })?;

        self.search_by_vector(&vector, options, cancellation, correlation_id)
    }

    fn supported_filter_clauses(&self) -> &[FilterClauseKind] {
        SUPPORTED_FILTER_CLAUSES
    }
}
