//! Source error types.
//!
//! Errors raised while reading the tour structure or fetching one of the
//! secondary feeds. None of them is fatal to a catalog build: the builder
//! logs them and carries on without the failing source.

use thiserror::Error;

/// Errors that can occur while reading a record source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be reached or refused to answer.
    #[error("Source {name} unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    /// The source did not answer within the allotted time.
    #[error("Source {name} timed out after {seconds}s")]
    Timeout { name: String, seconds: u64 },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The payload could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Reading or writing the local sheet cache failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SourceError {
    /// Create an unavailable-source error.
    pub fn unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(name: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            name: name.into(),
            seconds,
        }
    }

    /// Create an HTTP error.
    pub fn http(msg: impl Into<String>) -> Self {
        Self::HttpError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::CacheError(msg.into())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
