//! Long-lived catalog holder.
//!
//! The current catalog lives behind a `watch` channel. Readers take an
//! `Arc<Catalog>` snapshot; a rebuild replaces it in one step, so a query
//! never observes a half-built catalog.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument};

use crate::builder::{BuildReport, CatalogBuilder};
use crate::search::SearchEngine;
use tour_search_shared::Catalog;

/// Catalog service combining the builder, the search engine and the
/// current catalog.
pub struct CatalogService {
    builder: CatalogBuilder,
    engine: SearchEngine,
    catalog_tx: watch::Sender<Arc<Catalog>>,
}

impl CatalogService {
    /// Create a service holding an empty catalog until the first rebuild.
    pub fn new(builder: CatalogBuilder, engine: SearchEngine) -> Self {
        let (catalog_tx, _) = watch::channel(Arc::new(Catalog::empty()));
        Self {
            builder,
            engine,
            catalog_tx,
        }
    }

    /// Build a fresh catalog and publish it.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> BuildReport {
        let built = self.builder.build().await;
        let previous = self.catalog_tx.send_replace(Arc::new(built.catalog));
        info!(
            previous = previous.len(),
            current = built.report.entities,
            "Published catalog"
        );
        built.report
    }

    /// Snapshot of the current catalog.
    pub fn current(&self) -> Arc<Catalog> {
        self.catalog_tx.borrow().clone()
    }

    /// Receiver notified whenever a new catalog is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Catalog>> {
        self.catalog_tx.subscribe()
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }
}
