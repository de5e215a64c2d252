//! Test utilities for text search consumers

use super::options::TextSearchOptions;
use super::results::{KernelSearchResults, TextSearchResult};
use super::service::TextSearch;
use crate::error::{SearchResult, TextSearchError};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use textsearch_common::CorrelationId;
use tokio_util::sync::CancellationToken;

/// Mock text search that serves a fixed record list
///
/// Honours `top` and `skip`, renders strings as JSON and ignores filters.
/// Like a real search, the stream ends at the first mapping error and once
/// the cancellation token fires.
pub struct MockTextSearch<R> {
    records: Vec<R>,
    should_fail: bool,
    search_count: Arc<AtomicUsize>,
}

impl<R> MockTextSearch<R> {
    /// Create a mock that returns specific records, in order
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records,
            should_fail: false,
            search_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that returns no results
    pub fn empty() -> Self {
        Self::with_records(Vec::new())
    }

    /// Make every search fail before it starts
    #[must_use]
    pub const fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of searches started
    pub fn search_count(&self) -> usize {
        self.search_count.load(Ordering::SeqCst)
    }
}

impl<R: Clone + Send + 'static> MockTextSearch<R> {
    fn serve<T, F>(
        &self,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
        map: F,
    ) -> SearchResult<KernelSearchResults<T>>
    where
        T: Send + 'static,
        F: Fn(R) -> anyhow::Result<T>,
    {
        if cancellation.is_cancelled() {
            return Ok(KernelSearchResults::empty(CorrelationId::new()));
        }
        self.search_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(TextSearchError::Configuration(
                "mock text search configured to fail".to_string(),
            ));
        }

        let options = options.unwrap_or_default();
        let mut items: Vec<SearchResult<T>> = Vec::new();
        let window = self.records.iter().skip(options.skip).take(options.top);
        for (index, record) in window.cloned().enumerate() {
            match map(record) {
                Ok(item) => items.push(Ok(item)),
                Err(source) => {
                    items.push(Err(TextSearchError::Mapping { index, source }));
                    break;
                }
            }
        }
        let total_count = options
            .include_total_count
            .then(|| u64::try_from(self.records.len()).ok())
            .flatten();

        Ok(KernelSearchResults::new(
            stream::iter(items)
                .take_until(cancellation.clone().cancelled_owned())
                .boxed(),
            total_count,
            HashMap::new(),
            CorrelationId::new(),
        ))
    }
}

fn to_json<R: Serialize>(record: &R) -> anyhow::Result<String> {
    Ok(serde_json::to_string(record)?)
}

#[async_trait]
impl<R> TextSearch<R> for MockTextSearch<R>
where
    R: Clone + Serialize + Send + Sync + 'static,
{
    async fn search_as_string(
        &self,
        _query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<String>> {
        self.serve(options, cancellation, |record| to_json(&record))
    }

    async fn search_as_text_result(
        &self,
        _query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<TextSearchResult<R>>> {
        self.serve(options, cancellation, |record| {
            Ok(TextSearchResult::new(to_json(&record)?, record))
        })
    }

    async fn search_as_record(
        &self,
        _query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<R>> {
        self.serve(options, cancellation, Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_honours_window() {
        let search = MockTextSearch::with_records(vec![1_u32, 2, 3, 4]);
        let options = TextSearchOptions::new().with_top(2).with_skip(1).with_total_count();

        let results = search
            .search_as_string("q", Some(options), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(results.total_count(), Some(4));
        assert_eq!(results.try_collect_all().await.unwrap(), vec!["2", "3"]);
        assert_eq!(search.search_count(), 1);
    }

    /// Serializes as `true`, or fails when broken
    #[derive(Clone)]
    struct Flaky(bool);

    impl Serialize for Flaky {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.0 {
                serializer.serialize_bool(true)
            } else {
                Err(serde::ser::Error::custom("broken record"))
            }
        }
    }

    #[tokio::test]
    async fn test_mock_mapping_error_reports_position_and_ends_stream() {
        let search =
            MockTextSearch::with_records(vec![Flaky(true), Flaky(true), Flaky(false), Flaky(true)]);
        let options = TextSearchOptions::new().with_top(3).with_skip(1);

        let mut results = search
            .search_as_string("q", Some(options), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(results.next().await.unwrap().unwrap(), "true");
        match results.next().await {
            Some(Err(TextSearchError::Mapping { index, .. })) => assert_eq!(index, 1),
            other => panic!("expected mapping error, got {other:?}"),
        }
        assert!(results.next().await.is_none());
    }

    #[tokio::test]
    async fn test_mock_respects_cancellation() {
        let search = MockTextSearch::with_records(vec![1_u32, 2, 3]);
        let token = CancellationToken::new();

        let mut results = search.search_as_record("q", None, &token).await.unwrap();
        assert_eq!(results.next().await.unwrap().unwrap(), 1);
        token.cancel();
        assert!(results.next().await.is_none());

        let results = search.search_as_record("q", None, &token).await.unwrap();
        assert!(results.try_collect_all().await.unwrap().is_empty());
        assert_eq!(search.search_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let search = MockTextSearch::<u32>::empty().with_failure();
        let result = search
            .search_as_record("q", None, &CancellationToken::new())
            .await;
        assert!(result.is_err());
    }
}
