//! # Tour Search
//!
//! Main library for the virtual tour search catalog.
//!
//! This crate provides the configuration and dependency wiring used by the
//! `tour-search` command-line tool.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during initialization or while running a command.
#[derive(Error, Debug)]
pub enum TourSearchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] tour_search_pipeline::PipelineError),

    /// Source error.
    #[error("Source error: {0}")]
    SourceError(#[from] tour_search_repository::SourceError),

    /// Output serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TourSearchError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
