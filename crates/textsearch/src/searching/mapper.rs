//! Record projection strategies
//!
//! A search can hand back its backend records as they are, as strings, or as
//! normalized [`TextSearchResult`]s. The last two need a mapper. Plain
//! closures work as mappers; [`JsonStringMapper`] and the property mappers
//! cover the common cases.

use super::results::TextSearchResult;
use anyhow::Context;
use serde::Serialize;

/// Projects a backend record to a string
pub trait TextSearchStringMapper<R>: Send + Sync {
    /// # Errors
    /// Returns an error when the record has no usable string form
    fn map_to_string(&self, record: &R) -> anyhow::Result<String>;
}

/// Projects a backend record to a [`TextSearchResult`]
pub trait TextSearchResultMapper<R>: Send + Sync {
    /// # Errors
    /// Returns an error when the record cannot be normalized
    fn map_to_text_search_result(&self, record: R) -> anyhow::Result<TextSearchResult<R>>;
}

impl<R, F> TextSearchStringMapper<R> for F
where
    F: Fn(&R) -> anyhow::Result<String> + Send + Sync,
{
    fn map_to_string(&self, record: &R) -> anyhow::Result<String> {
        self(record)
    }
}

impl<R, F> TextSearchResultMapper<R> for F
where
    F: Fn(R) -> anyhow::Result<TextSearchResult<R>> + Send + Sync,
{
    fn map_to_text_search_result(&self, record: R) -> anyhow::Result<TextSearchResult<R>> {
        self(record)
    }
}

/// What to do when a mapper fails for one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MappingErrorPolicy {
    /// Yield the error and end the stream
    #[default]
    Propagate,
    /// Log the failure and continue with the next record
    Skip,
}

impl MappingErrorPolicy {
    pub const fn from_skip_flag(skip: bool) -> Self {
        if skip { Self::Skip } else { Self::Propagate }
    }
}

/// Renders a record as compact JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStringMapper;

impl<R: Serialize> TextSearchStringMapper<R> for JsonStringMapper {
    fn map_to_string(&self, record: &R) -> anyhow::Result<String> {
        serde_json::to_string(record).context("Failed to serialize search record")
    }
}

/// Records that expose the fields of a [`TextSearchResult`] directly
pub trait TextSearchRecord {
    fn result_name(&self) -> Option<String> {
        None
    }

    /// Text of the record; `None` means the record cannot be projected
    fn result_value(&self) -> Option<String>;

    fn result_link(&self) -> Option<String> {
        None
    }
}

/// Uses [`TextSearchRecord::result_value`] as the string form
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyStringMapper;

impl<R: TextSearchRecord> TextSearchStringMapper<R> for PropertyStringMapper {
    fn map_to_string(&self, record: &R) -> anyhow::Result<String> {
        record
            .result_value()
            .context("Search record has no text value")
    }
}

/// Builds a [`TextSearchResult`] from the [`TextSearchRecord`] accessors
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyResultMapper;

impl<R: TextSearchRecord> TextSearchResultMapper<R> for PropertyResultMapper {
    fn map_to_text_search_result(&self, record: R) -> anyhow::Result<TextSearchResult<R>> {
        let value = record
            .result_value()
            .context("Search record has no text value")?;
        Ok(TextSearchResult {
            name: record.result_name(),
            value,
            link: record.result_link(),
            inner_content: record,
        })
    }
}
