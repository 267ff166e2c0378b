//! Query entry point over a frozen catalog.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::config::CatalogConfig;
use crate::ranker::ResultRanker;
use tour_search_repository::FuzzyIndex;
use tour_search_shared::{Catalog, FuzzyMatch, ResultGroup};

/// Search engine answering queries with grouped, display-ready results.
#[derive(Clone)]
pub struct SearchEngine {
    index: Arc<dyn FuzzyIndex>,
    config: Arc<CatalogConfig>,
}

impl SearchEngine {
    pub fn new(index: Arc<dyn FuzzyIndex>, config: Arc<CatalogConfig>) -> Self {
        Self { index, config }
    }

    /// Run one query against `catalog`.
    ///
    /// # Arguments
    ///
    /// * `catalog` - The catalog to search
    /// * `query` - Raw user input; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// Result groups in display order. The wildcard token lists every
    /// entity with a score of zero. Queries shorter than the minimum length
    /// and index failures yield no groups.
    #[instrument(skip(self, catalog), fields(catalog_size = catalog.len()))]
    pub fn search<'c>(&self, catalog: &'c Catalog, query: &str) -> Vec<ResultGroup<'c>> {
        let query = query.trim();

        let matches = if query == self.config.wildcard_token.trim() {
            catalog
                .iter()
                .map(|e| FuzzyMatch::new(e.identity_key.clone(), 0.0))
                .collect()
        } else if query.chars().count() < self.config.min_query_length {
            debug!("Query below minimum length");
            return Vec::new();
        } else {
            match self.index.search(catalog, query) {
                Ok(mut hits) => {
                    if let Some(limit) = self.config.max_results {
                        hits.truncate(limit);
                    }
                    hits
                }
                Err(e) => {
                    warn!(error = %e, "Fuzzy index failed, returning no results");
                    return Vec::new();
                }
            }
        };

        ResultRanker::new(&self.config).rank(catalog, matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tour_search_repository::{SearchError, WeightedFuzzyIndex};
    use tour_search_shared::{CatalogEntity, EntityType, IdentityKey, SourceKind};

    struct CountingIndex {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FuzzyIndex for CountingIndex {
        fn search(&self, catalog: &Catalog, _query: &str) -> Result<Vec<FuzzyMatch>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::index("index offline"));
            }
            Ok(catalog
                .iter()
                .map(|e| FuzzyMatch::new(e.identity_key.clone(), 1.0))
                .collect())
        }
    }

    fn entity(id: &str, entity_type: EntityType, label: &str, order: u32) -> CatalogEntity {
        let mut e = CatalogEntity::new(IdentityKey::new(SourceKind::Tour, id), entity_type, 1);
        e.label = label.to_string();
        e.playlist_order = Some(order);
        e
    }

    fn five_entities() -> Catalog {
        Catalog::freeze(
            vec![
                entity("h2", EntityType::Hotspot, "Exit", 4),
                entity("p2", EntityType::Panorama, "Kitchen", 3),
                entity("v1", EntityType::Video, "Welcome", 0),
                entity("h1", EntityType::Hotspot, "Info", 2),
                entity("p1", EntityType::Panorama, "Lobby", 1),
            ],
            Utc::now(),
        )
    }

    fn engine(index: Arc<dyn FuzzyIndex>, config: CatalogConfig) -> SearchEngine {
        SearchEngine::new(index, Arc::new(config))
    }

    #[test]
    fn test_wildcard_lists_whole_catalog_grouped() {
        let catalog = five_entities();
        let index = Arc::new(CountingIndex {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let engine = engine(index.clone(), CatalogConfig::default());

        let groups = engine.search(&catalog, " * ");

        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
        let total: usize = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, 5);
        let types: Vec<EntityType> = groups.iter().map(|g| g.entity_type).collect();
        assert_eq!(types, vec![EntityType::Panorama, EntityType::Hotspot, EntityType::Video]);
        for group in &groups {
            let orders: Vec<u32> = group.entries.iter().filter_map(|e| e.entity.playlist_order).collect();
            let mut sorted = orders.clone();
            sorted.sort();
            assert_eq!(orders, sorted);
            assert!(group.entries.iter().all(|e| e.score == 0.0));
        }
    }

    #[test]
    fn test_short_query_returns_nothing() {
        let catalog = five_entities();
        let index = Arc::new(CountingIndex {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let engine = engine(index.clone(), CatalogConfig::default());

        assert!(engine.search(&catalog, "l").is_empty());
        assert!(engine.search(&catalog, "   ").is_empty());
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_index_failure_returns_nothing() {
        let catalog = five_entities();
        let index = Arc::new(CountingIndex {
            calls: AtomicUsize::new(0),
            fail: true,
        });

        assert!(engine(index, CatalogConfig::default()).search(&catalog, "lobby").is_empty());
    }

    #[test]
    fn test_max_results_truncates_hits() {
        let catalog = five_entities();
        let index = Arc::new(CountingIndex {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let config = CatalogConfig {
            max_results: Some(2),
            ..Default::default()
        };

        let groups = engine(index, config).search(&catalog, "anything");
        let total: usize = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_fuzzy_query_with_highlights() {
        let catalog = five_entities();
        let engine = engine(Arc::new(WeightedFuzzyIndex::default()), CatalogConfig::default());

        let groups = engine.search(&catalog, "lob");

        assert_eq!(groups.len(), 1);
        let entry = &groups[0].entries[0];
        assert_eq!(entry.entity.label, "Lobby");
        assert_eq!(entry.highlights, vec![0..3]);
    }
}
