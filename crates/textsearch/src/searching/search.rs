//! Text search over a vector store

use super::mapper::{
    MappingErrorPolicy, PropertyResultMapper, PropertyStringMapper, TextSearchRecord,
    TextSearchResultMapper, TextSearchStringMapper,
};
use super::options::TextSearchOptions;
use super::projection::project;
use super::results::{KernelSearchResults, TextSearchResult};
use super::service::TextSearch;
use crate::error::{SearchResult, TextSearchError};
use async_trait::async_trait;
use std::sync::Arc;
use textsearch_common::CorrelationId;
use textsearch_config::SearchConfig;
use textsearch_embeddings::EmbeddingGenerator;
use textsearch_vector_data::{
    FilterClauseKind, VectorDataError, VectorSearchFilter, VectorSearchOptions,
    VectorSearchResults, VectorizableTextSearch, VectorizedSearch,
};
use tokio_util::sync::CancellationToken;

/// How the query reaches the backend
enum SearchTarget<R: Send + 'static> {
    /// The query is embedded here, then searched by vector
    Vectorized {
        backend: Arc<dyn VectorizedSearch<R>>,
        generator: Arc<dyn EmbeddingGenerator>,
    },
    /// The backend embeds the query text itself
    Vectorizable {
        backend: Arc<dyn VectorizableTextSearch<R>>,
    },
}

impl<R: Send + 'static> SearchTarget<R> {
    fn supported_filter_clauses(&self) -> &[FilterClauseKind] {
        match self {
            Self::Vectorized { backend, .. } => backend.supported_filter_clauses(),
            Self::Vectorizable { backend } => backend.supported_filter_clauses(),
        }
    }

    /// Reject a generator whose vectors the backend cannot search
    fn check_dimensions(&self) -> SearchResult<()> {
        let Self::Vectorized { backend, generator } = self else {
            return Ok(());
        };
        let actual = generator.embedding_dimension();
        match backend.vector_dimension() {
            Some(expected) if expected != actual => Err(TextSearchError::Configuration(format!(
                "model '{}' embeds to {actual} dimensions, backend expects {expected}",
                generator.model_name(),
            ))),
            _ => Ok(()),
        }
    }

    const fn flavour(&self) -> &'static str {
        match self {
            Self::Vectorized { .. } => "vectorized",
            Self::Vectorizable { .. } => "vectorizable",
        }
    }
}

/// [`TextSearch`] backed by a vector store
///
/// Holds no per-call state, so one instance can serve concurrent searches.
/// String and normalized projections need their mapper configured;
/// record projection always works.
pub struct VectorStoreTextSearch<R: Send + 'static> {
    target: SearchTarget<R>,
    string_mapper: Option<Arc<dyn TextSearchStringMapper<R>>>,
    result_mapper: Option<Arc<dyn TextSearchResultMapper<R>>>,
    config: SearchConfig,
    mapping_error_policy: MappingErrorPolicy,
}

impl<R: Send + 'static> VectorStoreTextSearch<R> {
    /// Search a store that takes query vectors, embedding queries with `generator`
    pub fn from_vectorized_search(
        backend: Arc<dyn VectorizedSearch<R>>,
        generator: Arc<dyn EmbeddingGenerator>,
    ) -> Self {
        Self::with_target(SearchTarget::Vectorized { backend, generator })
    }

    /// Search a store that vectorizes query text itself
    pub fn from_vectorizable_text_search(backend: Arc<dyn VectorizableTextSearch<R>>) -> Self {
        Self::with_target(SearchTarget::Vectorizable { backend })
    }

    fn with_target(target: SearchTarget<R>) -> Self {
        let config = SearchConfig::default();
        Self {
            target,
            string_mapper: None,
            result_mapper: None,
            mapping_error_policy: MappingErrorPolicy::from_skip_flag(config.skip_mapping_errors),
            config,
        }
    }

    #[must_use]
    pub fn with_string_mapper(mut self, mapper: impl TextSearchStringMapper<R> + 'static) -> Self {
        self.string_mapper = Some(Arc::new(mapper));
        self
    }

    #[must_use]
    pub fn with_result_mapper(mut self, mapper: impl TextSearchResultMapper<R> + 'static) -> Self {
        self.result_mapper = Some(Arc::new(mapper));
        self
    }

    /// Apply search defaults and bounds; also resets the mapping error policy
    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.mapping_error_policy = MappingErrorPolicy::from_skip_flag(config.skip_mapping_errors);
        self.config = config;
        self
    }

    #[must_use]
    pub const fn with_mapping_error_policy(mut self, policy: MappingErrorPolicy) -> Self {
        self.mapping_error_policy = policy;
        self
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Translate caller options to backend options
    ///
    /// # Errors
    /// Returns `QueryTranslation` for a `top` outside `1..=max_top` or a
    /// filter clause kind the backend does not support
    fn translate_options(&self, options: &TextSearchOptions) -> SearchResult<VectorSearchOptions> {
        if options.top == 0 {
            return Err(TextSearchError::QueryTranslation(
                "top must be at least 1".to_string(),
            ));
        }
        if options.top > self.config.max_top {
            return Err(TextSearchError::QueryTranslation(format!(
                "top {} exceeds the maximum of {}",
                options.top, self.config.max_top
            )));
        }

        let filter = match &options.filter {
            Some(filter) if !filter.is_empty() => {
                if let Some(kind) = filter.first_unsupported(self.target.supported_filter_clauses())
                {
                    return Err(TextSearchError::QueryTranslation(format!(
                        "filter clause {kind} is not supported by the {} backend",
                        self.target.flavour()
                    )));
                }
                Some(
                    filter
                        .clauses()
                        .iter()
                        .cloned()
                        .fold(VectorSearchFilter::new(), VectorSearchFilter::with_clause),
                )
            }
            _ => None,
        };

        Ok(VectorSearchOptions {
            top: options.top,
            skip: options.skip,
            filter,
            include_total_count: options.include_total_count,
        })
    }

    /// Run the query against the backend
    ///
    /// Returns `None` when the search was cancelled before the backend
    /// handed back a result stream.
    #[tracing::instrument(
        skip(self, options, cancellation),
        fields(correlation_id, flavour = self.target.flavour(), query_len = query.len())
    )]
    async fn execute(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
        correlation_id: &CorrelationId,
    ) -> SearchResult<Option<VectorSearchResults<R>>> {
        tracing::Span::current().record("correlation_id", correlation_id.to_string());

        let options = options.unwrap_or_else(|| TextSearchOptions::from_config(&self.config));
        let vector_options = self.translate_options(&options)?;
        self.target.check_dimensions()?;

        if cancellation.is_cancelled() {
            tracing::debug!("Search cancelled before it started");
            return Ok(None);
        }

        let started = match &self.target {
            SearchTarget::Vectorized { backend, generator } => {
                tracing::debug!(model = generator.model_name(), "Generating query embedding");
                let vector = match generator.generate_embedding(query, cancellation).await {
                    Ok(vector) => vector,
                    Err(e) if e.is_cancelled() => {
                        tracing::debug!("Search cancelled during query embedding");
                        return Ok(None);
                    }
                    Err(source) => {
                        tracing::error!(error = %source, "Query embedding failed");
                        return Err(TextSearchError::Embedding {
                            query: query.to_string(),
                            correlation_id: correlation_id.clone(),
                            source,
                        });
                    }
                };

                tracing::debug!("Performing vector search");
                backend
                    .vectorized_search(vector, &vector_options, cancellation, correlation_id)
                    .await
            }
            SearchTarget::Vectorizable { backend } => {
                tracing::debug!("Performing vectorizable text search");
                backend
                    .vectorizable_text_search(query, &vector_options, cancellation, correlation_id)
                    .await
            }
        };

        match started {
            Ok(results) => {
                tracing::info!(
                    top = vector_options.top,
                    skip = vector_options.skip,
                    total_count = ?results.total_count,
                    "Search started"
                );
                Ok(Some(results))
            }
            Err(VectorDataError::Cancelled(_)) if cancellation.is_cancelled() => {
                tracing::debug!("Search cancelled while starting");
                Ok(None)
            }
            Err(VectorDataError::UnsupportedFilter(message)) => {
                Err(TextSearchError::QueryTranslation(message))
            }
            Err(
                source @ (VectorDataError::Configuration(_)
                | VectorDataError::VectorDimensionMismatch { .. }),
            ) => {
                tracing::error!(error = %source, "Search backend rejected its setup");
                Err(TextSearchError::Configuration(source.to_string()))
            }
            Err(source) => {
                tracing::error!(error = %source, "Search backend failed to start");
                Err(TextSearchError::Backend {
                    correlation_id: correlation_id.clone(),
                    source,
                })
            }
        }
    }

    /// Run the query and project every record through `map`
    async fn search_with<T, F>(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
        map: F,
    ) -> SearchResult<KernelSearchResults<T>>
    where
        T: Send + 'static,
        F: FnMut(R) -> anyhow::Result<T> + Send + 'static,
    {
        let correlation_id = CorrelationId::new();
        let Some(results) = self
            .execute(query, options, cancellation, &correlation_id)
            .await?
        else {
            return Ok(KernelSearchResults::empty(correlation_id));
        };

        let VectorSearchResults {
            results,
            total_count,
            metadata,
        } = results;

        let projected = project(
            results,
            map,
            cancellation.clone(),
            correlation_id.clone(),
            self.mapping_error_policy,
        );
        Ok(KernelSearchResults::new(
            projected,
            total_count,
            metadata,
            correlation_id,
        ))
    }
}

impl<R: TextSearchRecord + Send + 'static> VectorStoreTextSearch<R> {
    /// Use the [`TextSearchRecord`] accessors for both projections
    #[must_use]
    pub fn with_property_mappers(self) -> Self {
        self.with_string_mapper(PropertyStringMapper)
            .with_result_mapper(PropertyResultMapper)
    }
}

#[async_trait]
impl<R: Send + 'static> TextSearch<R> for VectorStoreTextSearch<R> {
    async fn search_as_string(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<String>> {
        let mapper = self.string_mapper.clone().ok_or_else(|| {
            TextSearchError::Configuration("no string mapper configured".to_string())
        })?;
        self.search_with(query, options, cancellation, move |record: R| {
            mapper.map_to_string(&record)
        })
        .await
    }

    async fn search_as_text_result(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<TextSearchResult<R>>> {
        let mapper = self.result_mapper.clone().ok_or_else(|| {
            TextSearchError::Configuration("no text search result mapper configured".to_string())
        })?;
        self.search_with(query, options, cancellation, move |record: R| {
            mapper.map_to_text_search_result(record)
        })
        .await
    }

    async fn search_as_record(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<R>> {
        self.search_with(query, options, cancellation, Ok).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searching::options::TextSearchFilter;
    use serde::Serialize;
    use textsearch_embeddings::test_mocks::MockEmbeddingGenerator;
    use textsearch_vector_data::{FilterClause, InMemoryVectorStore};

    #[derive(Debug, Clone, Serialize)]
    struct Note {
        body: String,
    }

    fn search() -> VectorStoreTextSearch<Note> {
        VectorStoreTextSearch::from_vectorized_search(
            Arc::new(InMemoryVectorStore::<Note>::new("notes", 2)),
            Arc::new(MockEmbeddingGenerator::new(2)),
        )
    }

    #[test]
    fn test_translate_copies_window_and_count() {
        let options = TextSearchOptions::new()
            .with_top(7)
            .with_skip(3)
            .with_total_count();

        let translated = search().translate_options(&options).unwrap();
        assert_eq!(translated.top, 7);
        assert_eq!(translated.skip, 3);
        assert!(translated.include_total_count);
        assert!(translated.filter.is_none());
    }

    #[test]
    fn test_translate_keeps_filter_clauses_in_order() {
        let options = TextSearchOptions::new().with_filter(
            TextSearchFilter::new()
                .equal_to("category", "rust")
                .any_tag_equal_to("tags", "async"),
        );

        let filter = search().translate_options(&options).unwrap().filter.unwrap();
        assert!(matches!(filter.clauses().first(), Some(FilterClause::EqualTo { .. })));
        assert!(matches!(filter.clauses().get(1), Some(FilterClause::AnyTagEqualTo { .. })));
    }

    #[test]
    fn test_empty_filter_is_dropped() {
        let options = TextSearchOptions::new().with_filter(TextSearchFilter::new());
        assert!(search().translate_options(&options).unwrap().filter.is_none());
    }

    #[test]
    fn test_generator_dimension_must_match_backend() {
        assert!(search().target.check_dimensions().is_ok());

        let mismatched = VectorStoreTextSearch::<Note>::from_vectorized_search(
            Arc::new(InMemoryVectorStore::<Note>::new("notes", 2)),
            Arc::new(MockEmbeddingGenerator::new(3)),
        );
        assert!(matches!(
            mismatched.target.check_dimensions(),
            Err(TextSearchError::Configuration(_))
        ));
    }

    #[test]
    fn test_top_bounds() {
        let search = search().with_config(SearchConfig {
            max_top: 10,
            ..SearchConfig::default()
        });
        assert!(search.translate_options(&TextSearchOptions::new().with_top(10)).is_ok());
        assert!(matches!(
            search.translate_options(&TextSearchOptions::new().with_top(11)),
            Err(TextSearchError::QueryTranslation(_))
        ));
        assert!(matches!(
            search.translate_options(&TextSearchOptions::new().with_top(0)),
            Err(TextSearchError::QueryTranslation(_))
        ));
    }
}
