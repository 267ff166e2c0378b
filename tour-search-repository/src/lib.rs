//! # Tour Search Repository
//!
//! This crate provides traits and implementations for the collaborators the
//! catalog engine talks to: the host tour structure, the business and
//! spreadsheet feeds, the spreadsheet cache, and the fuzzy-match index.

pub mod cache;
pub mod config;
pub mod errors;
pub mod feeds;
pub mod fuzzy;
pub mod interfaces;
pub mod sheet;

pub use cache::SheetCache;
pub use config::FuzzyIndexConfig;
pub use errors::{SearchError, SourceError};
pub use fuzzy::WeightedFuzzyIndex;
pub use interfaces::{FuzzyIndex, RecordFeed, TourSourceAdapter};
pub use sheet::SheetFormat;
