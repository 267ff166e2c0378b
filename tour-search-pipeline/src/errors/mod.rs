//! Error types for the catalog pipeline.

use thiserror::Error;

use tour_search_shared::SourceKind;

/// Errors that can occur while configuring the pipeline.
///
/// A running build never returns an error: failing sources, malformed
/// records and ambiguous matches all degrade to a smaller catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Reasons a single raw record is rejected by the normalizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The record carries none of the fields needed to identify it.
    #[error("{source_kind} record #{ordinal} has no identity fields")]
    MissingIdentity { source_kind: SourceKind, ordinal: usize },

    /// The record repeats an id already seen in the same source.
    #[error("{source_kind} record #{ordinal} repeats id {id}")]
    DuplicateIdentity {
        source_kind: SourceKind,
        ordinal: usize,
        id: String,
    },
}
