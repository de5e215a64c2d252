//! Search result containers

use crate::error::SearchResult;
use futures::stream::{self, BoxStream, Fuse, FusedStream};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::task::{Context, Poll};
use textsearch_common::CorrelationId;

/// Normalized view of one search hit
///
/// `inner_content` keeps the backend record the view was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSearchResult<R> {
    pub name: Option<String>,
    pub value: String,
    /// URI of the source document, passed through from the mapper unvalidated
    pub link: Option<String>,
    pub inner_content: R,
}

impl<R> TextSearchResult<R> {
    pub fn new(value: impl Into<String>, inner_content: R) -> Self {
        Self {
            name: None,
            value: value.into(),
            link: None,
            inner_content,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the link; the string is stored as given and never parsed as a URI
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Results of one search call, projected to `T`
///
/// The results are a single-pass stream: elements are produced lazily as
/// the stream is polled, in backend order. Once the stream has ended, by
/// exhaustion, error or cancellation, it keeps returning `None` and never
/// re-issues the query. `total_count` and `metadata` are fixed when the
/// search starts.
pub struct KernelSearchResults<T> {
    results: Fuse<BoxStream<'static, SearchResult<T>>>,
    total_count: Option<u64>,
    metadata: HashMap<String, serde_json::Value>,
    correlation_id: CorrelationId,
}

impl<T: Send + 'static> KernelSearchResults<T> {
    pub fn new(
        results: BoxStream<'static, SearchResult<T>>,
        total_count: Option<u64>,
        metadata: HashMap<String, serde_json::Value>,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            results: results.fuse(),
            total_count,
            metadata,
            correlation_id,
        }
    }

    /// An already finished result set
    pub fn empty(correlation_id: CorrelationId) -> Self {
        Self::new(stream::empty().boxed(), None, HashMap::new(), correlation_id)
    }
}

impl<T> KernelSearchResults<T> {
    /// Exact number of matches, when the backend reported one
    pub const fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub const fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Correlation ID shared by every log line of this search
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Drain the remaining elements, stopping at the first error
    ///
    /// # Errors
    /// Returns the first error the stream yields
    pub async fn try_collect_all(mut self) -> SearchResult<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.results.next().await {
            items.push(item?);
        }
        Ok(items)
    }
}

impl<T> Stream for KernelSearchResults<T> {
    type Item = SearchResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().results.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.results.size_hint()
    }
}

impl<T> FusedStream for KernelSearchResults<T> {
    fn is_terminated(&self) -> bool {
        self.results.is_terminated()
    }
}

impl<T> std::fmt::Debug for KernelSearchResults<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelSearchResults")
            .field("total_count", &self.total_count)
            .field("metadata", &self.metadata)
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TextSearchError, TextSearchErrorKind};

    #[test]
    fn test_link_is_stored_as_given() {
        let result = TextSearchResult::new("body", 7_u32)
            .with_name("Title")
            .with_link("docs/relative page.md");

        assert_eq!(result.link.as_deref(), Some("docs/relative page.md"));
        assert_eq!(result.name.as_deref(), Some("Title"));
        assert_eq!(result.inner_content, 7);
    }

    #[tokio::test]
    async fn test_stream_stays_finished_after_exhaustion() {
        let items: Vec<SearchResult<u32>> = vec![Ok(1), Ok(2)];
        let mut results = KernelSearchResults::new(
            stream::iter(items).boxed(),
            Some(2),
            HashMap::new(),
            CorrelationId::new(),
        );

        assert_eq!(results.next().await.unwrap().unwrap(), 1);
        assert_eq!(results.next().await.unwrap().unwrap(), 2);
        assert!(results.next().await.is_none());
        assert!(results.is_terminated());
        assert!(results.next().await.is_none());
        assert_eq!(results.total_count(), Some(2));
    }

    #[tokio::test]
    async fn test_try_collect_all_stops_at_error() {
        let items: Vec<SearchResult<u32>> = vec![
            Ok(1),
            Err(TextSearchError::QueryTranslation("bad".to_string())),
            Ok(3),
        ];
        let results = KernelSearchResults::new(
            stream::iter(items).boxed(),
            None,
            HashMap::new(),
            CorrelationId::new(),
        );

        let err = results.try_collect_all().await.unwrap_err();
        assert_eq!(err.kind(), TextSearchErrorKind::QueryTranslation);
    }

    #[tokio::test]
    async fn test_empty_results() {
        let results = KernelSearchResults::<String>::empty(CorrelationId::new());
        assert!(results.metadata().is_empty());
        assert!(results.try_collect_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_text_search_result_builder() {
        let result = TextSearchResult::new("body", 7_u32)
            .with_name("title")
            .with_link("https://example.com/7");

        assert_eq!(result.name.as_deref(), Some("title"));
        assert_eq!(result.value, "body");
        assert_eq!(result.link.as_deref(), Some("https://example.com/7"));
        assert_eq!(result.inner_content, 7);
    }
}
