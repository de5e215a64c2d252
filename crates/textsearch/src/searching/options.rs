//! Caller-facing search options

use serde_json::Value;
use textsearch_config::{DEFAULT_SEARCH_TOP, SearchConfig};
use textsearch_vector_data::{FilterClause, FilterClauseKind};

/// Conjunctive filter over record fields
///
/// Clauses are handed to the backend untouched; a clause kind the backend
/// cannot translate fails the search before it starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSearchFilter {
    clauses: Vec<FilterClause>,
}

impl TextSearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    #[must_use]
    pub fn equal_to(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FilterClause::EqualTo {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require the list-valued `field` to contain `value`
    #[must_use]
    pub fn any_tag_equal_to(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FilterClause::AnyTagEqualTo {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// First clause kind not contained in `supported`, if any
    pub(crate) fn first_unsupported(
        &self,
        supported: &[FilterClauseKind],
    ) -> Option<FilterClauseKind> {
        self.clauses
            .iter()
            .map(FilterClause::kind)
            .find(|kind| !supported.contains(kind))
    }
}

/// Options for a single search call
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchOptions {
    /// Maximum number of results to return
    pub top: usize,
    /// Number of ranked results to skip
    pub skip: usize,
    pub filter: Option<TextSearchFilter>,
    /// Ask the backend for an exact total count
    pub include_total_count: bool,
}

impl Default for TextSearchOptions {
    fn default() -> Self {
        Self {
            top: DEFAULT_SEARCH_TOP,
            skip: 0,
            filter: None,
            include_total_count: false,
        }
    }
}

impl TextSearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used when a caller passes none
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            top: config.default_top,
            include_total_count: config.include_total_count,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    #[must_use]
    pub const fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TextSearchFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub const fn with_total_count(mut self) -> Self {
        self.include_total_count = true;
        self
    }
}
