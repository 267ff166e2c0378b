//! Fuzzy-match index trait definition.

use crate::errors::SearchError;
use tour_search_shared::{Catalog, FuzzyMatch};

/// A weighted fuzzy-match index over a frozen catalog.
///
/// The index owns text similarity entirely: tokenization, case folding and
/// edit-distance scoring happen behind this trait. It is expected to honour
/// each entity's `boost_weight` when ordering hits.
pub trait FuzzyIndex: Send + Sync {
    /// Match a query against every entity of the catalog.
    ///
    /// # Arguments
    ///
    /// * `catalog` - The frozen catalog to search
    /// * `query` - Free query text, already trimmed
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<FuzzyMatch>)` - Hits ordered best first
    /// * `Err(SearchError)` - If the query cannot be evaluated
    fn search(&self, catalog: &Catalog, query: &str) -> Result<Vec<FuzzyMatch>, SearchError>;
}
