//! Error types for the tour search repository.

mod search_error;
mod source_error;

pub use search_error::SearchError;
pub use source_error::SourceError;
