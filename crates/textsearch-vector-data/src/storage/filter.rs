//! Backend-native filter expressions
//!
//! A [`VectorSearchFilter`] is a conjunction: a record matches when every
//! clause matches. Backends advertise which [`FilterClauseKind`]s they can
//! translate natively; callers are expected to reject anything else before
//! the search is issued rather than filter on the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kinds of clause a backend may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterClauseKind {
    /// Field equals a value
    EqualTo,
    /// A list-valued field contains a value
    AnyTagEqualTo,
}

impl std::fmt::Display for FilterClauseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EqualTo => write!(f, "EqualTo"),
            Self::AnyTagEqualTo => write!(f, "AnyTagEqualTo"),
        }
    }
}

/// A single predicate over one record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterClause {
    EqualTo { field: String, value: Value },
    AnyTagEqualTo { field: String, value: Value },
}

impl FilterClause {
    pub const fn kind(&self) -> FilterClauseKind {
        match self {
            Self::EqualTo { .. } => FilterClauseKind::EqualTo,
            Self::AnyTagEqualTo { .. } => FilterClauseKind::AnyTagEqualTo,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::EqualTo { field, .. } | Self::AnyTagEqualTo { field, .. } => field,
        }
    }

    /// Evaluate the clause against a record rendered as a JSON object
    ///
    /// A missing field never matches.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(actual) = record.get(self.field()) else {
            return false;
        };
        match self {
            Self::EqualTo { value, .. } => actual == value,
            Self::AnyTagEqualTo { value, .. } => actual
                .as_array()
                .is_some_and(|tags| tags.iter().any(|tag| tag == value)),
        }
    }
}

/// Conjunction of filter clauses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchFilter {
    clauses: Vec<FilterClause>,
}

impl VectorSearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn equal_to(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FilterClause::EqualTo {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn any_tag_equal_to(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(FilterClause::AnyTagEqualTo {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn with_clause(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}
