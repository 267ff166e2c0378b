//! Search error types.
//!
//! This module defines the errors the fuzzy index can report for a query.

use thiserror::Error;

/// Errors that can occur while querying the fuzzy index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The provided query is invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The index could not evaluate the query.
    #[error("Index error: {0}")]
    IndexError(String),
}

impl SearchError {
    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }
}
