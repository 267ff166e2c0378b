//! Weighted fuzzy-match index implementation.

use strsim::jaro_winkler;
use tracing::{debug, instrument};

use crate::config::FuzzyIndexConfig;
use crate::errors::SearchError;
use crate::fuzzy::highlight::highlight_ranges;
use crate::interfaces::FuzzyIndex;
use tour_search_shared::{Catalog, CatalogEntity, FuzzyMatch};

/// Fuzzy index scoring each entity field with Jaro-Winkler similarity.
///
/// Every query term is scored against the words of a field: a word prefix
/// scores 1.0, any other substring 0.9, otherwise the best Jaro-Winkler
/// similarity. A field scores the mean over terms and an entity the best
/// weighted field. Entities at or above the threshold are reported with
/// their score multiplied by the entity's `boost_weight`.
#[derive(Debug, Clone, Default)]
pub struct WeightedFuzzyIndex {
    config: FuzzyIndexConfig,
}

impl WeightedFuzzyIndex {
    pub fn new(config: FuzzyIndexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FuzzyIndexConfig {
        &self.config
    }

    fn term_score(term: &str, field: &str) -> f64 {
        let words = field
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty());

        let mut best: f64 = 0.0;
        for word in words {
            if word.starts_with(term) {
                return 1.0;
            }
            best = best.max(jaro_winkler(term, word));
        }
        if field.contains(term) {
            best = best.max(0.9);
        }
        best
    }

    fn field_score(terms: &[String], field: &str) -> f64 {
        if field.is_empty() || terms.is_empty() {
            return 0.0;
        }
        let field = field.to_lowercase();
        let total: f64 = terms.iter().map(|t| Self::term_score(t, &field)).sum();
        total / terms.len() as f64
    }

    /// Unboosted similarity of an entity to the query terms, in 0.0..=1.0.
    fn similarity(&self, terms: &[String], entity: &CatalogEntity) -> f64 {
        let max_weight = self.config.max_weight();
        if max_weight <= 0.0 {
            return 0.0;
        }

        let tags = entity.tags.join(" ");
        let description = entity.description.as_deref().unwrap_or_default();
        let fields = [
            (entity.label.as_str(), self.config.label_weight),
            (entity.subtitle.as_str(), self.config.subtitle_weight),
            (tags.as_str(), self.config.tags_weight),
            (description, self.config.description_weight),
        ];

        fields
            .iter()
            .map(|(text, weight)| Self::field_score(terms, text) * weight)
            .fold(0.0, f64::max)
            / max_weight
    }
}

impl FuzzyIndex for WeightedFuzzyIndex {
    #[instrument(skip(self, catalog), fields(catalog_size = catalog.len()))]
    fn search(&self, catalog: &Catalog, query: &str) -> Result<Vec<FuzzyMatch>, SearchError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Err(SearchError::invalid_query("query has no terms"));
        }
        let term_refs: Vec<&str> = terms.iter().map(String::as_str).collect();

        let mut hits: Vec<FuzzyMatch> = catalog
            .iter()
            .filter_map(|entity| {
                let similarity = self.similarity(&terms, entity);
                if similarity < self.config.threshold {
                    return None;
                }
                Some(FuzzyMatch {
                    key: entity.identity_key.clone(),
                    score: similarity * entity.boost_weight,
                    highlights: highlight_ranges(&entity.label, &term_refs),
                })
            })
            .collect();

        // Stable sort keeps catalog order among equal scores.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(hits = hits.len(), "Fuzzy search completed");
        Ok(hits)
    }
}
