//! # Tour Search Pipeline
//!
//! This crate reconciles the tour structure with the business and
//! spreadsheet feeds into one searchable catalog, and answers queries
//! against it.
//!
//! ## Architecture
//!
//! A build runs the records of each source through:
//!
//! 1. **Normalizer**: Turns raw records into catalog entities
//! 2. **Matcher**: Finds candidate pairs between tour entities and secondary records
//! 3. **Resolver**: Reduces candidates to at most one mapping per record
//! 4. **Merger**: Combines matched records and applies label and boost rules
//! 5. **Builder**: Coordinates the passes and freezes the catalog
//!
//! Queries go through the **Search** engine and the **Ranker**, which groups
//! and orders the hits for display.

pub mod builder;
pub mod config;
pub mod errors;
pub mod matcher;
pub mod merger;
pub mod normalizer;
pub mod ranker;
pub mod resolver;
pub mod search;
pub mod service;

pub use builder::{BuildReport, BuiltCatalog, CatalogBuilder, CatalogInputs};
pub use config::CatalogConfig;
pub use errors::{NormalizeError, PipelineError};
pub use ranker::ResultRanker;
pub use search::SearchEngine;
pub use service::CatalogService;
