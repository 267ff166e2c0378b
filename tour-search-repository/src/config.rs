//! Configuration types for the fuzzy index.

use serde::Deserialize;

/// Configuration for the [`WeightedFuzzyIndex`](crate::fuzzy::WeightedFuzzyIndex).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FuzzyIndexConfig {
    /// Minimum similarity (0.0..=1.0) an entity must reach to be reported.
    pub threshold: f64,
    /// Weight of the label field.
    pub label_weight: f64,
    /// Weight of the subtitle field.
    pub subtitle_weight: f64,
    /// Weight of the joined tag list.
    pub tags_weight: f64,
    /// Weight of the secondary description.
    pub description_weight: f64,
}

impl Default for FuzzyIndexConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            label_weight: 1.0,
            subtitle_weight: 0.8,
            tags_weight: 0.6,
            description_weight: 0.5,
        }
    }
}

impl FuzzyIndexConfig {
    /// Create a config with a custom similarity threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// The largest of the field weights.
    pub fn max_weight(&self) -> f64 {
        [
            self.label_weight,
            self.subtitle_weight,
            self.tags_weight,
            self.description_weight,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}
