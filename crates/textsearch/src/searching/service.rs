//! Text search service contract

use super::options::TextSearchOptions;
use super::results::{KernelSearchResults, TextSearchResult};
use crate::error::SearchResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Searches a text corpus and projects each hit three ways
///
/// Every call runs the query once and returns a lazily produced,
/// single-pass result stream. `options` of `None` uses the service's
/// configured defaults. Cancelling `cancellation` ends the stream without
/// an error.
#[async_trait]
pub trait TextSearch<R: Send + 'static>: Send + Sync {
    /// Search and project each hit to a string
    async fn search_as_string(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<String>>;

    /// Search and project each hit to a normalized [`TextSearchResult`]
    async fn search_as_text_result(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<TextSearchResult<R>>>;

    /// Search and return the backend records as they are
    async fn search_as_record(
        &self,
        query: &str,
        options: Option<TextSearchOptions>,
        cancellation: &CancellationToken,
    ) -> SearchResult<KernelSearchResults<R>>;
}
