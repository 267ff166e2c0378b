//! Configuration for catalog building and querying.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration. Field names are camelCase on the wire.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::errors::PipelineError;
use tour_search_repository::FuzzyIndexConfig;
use tour_search_shared::{CatalogEntity, EntityType};

/// Placeholder used when the configured placeholder text is blank.
pub const DEFAULT_PLACEHOLDER: &str = "Unnamed";

/// Reserved query that lists the whole catalog.
pub const DEFAULT_WILDCARD: &str = "*";

/// Per-source precedence settings for a secondary feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceSettings {
    /// Whether the feed is fetched and reconciled at all.
    pub enabled: bool,
    /// Whether matched records replace the tour entity's label and subtitle.
    pub replaces_native: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            replaces_native: false,
        }
    }
}

/// Whether a filter rule admits or rejects its listed values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    None,
    Whitelist,
    Blacklist,
}

/// One allow-list or block-list. A rule with no values is inactive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRule {
    pub mode: FilterMode,
    pub values: Vec<String>,
}

impl FilterRule {
    pub fn whitelist<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Whitelist,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn blacklist<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Blacklist,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Apply the rule given whether the entity hits any listed value.
    fn admits(&self, hit: impl FnOnce(&[String]) -> bool) -> bool {
        if self.values.is_empty() {
            return true;
        }
        match self.mode {
            FilterMode::None => true,
            FilterMode::Whitelist => hit(&self.values),
            FilterMode::Blacklist => !hit(&self.values),
        }
    }
}

/// Filters applied before an entity enters the catalog.
///
/// Types and tags compare case-insensitively for equality, labels by
/// case-insensitive substring.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityFilters {
    pub types: FilterRule,
    pub tags: FilterRule,
    pub labels: FilterRule,
}

impl EntityFilters {
    pub fn admits(&self, entity: &CatalogEntity) -> bool {
        let type_ok = self.types.admits(|values| {
            values
                .iter()
                .any(|v| v.parse::<EntityType>().is_ok_and(|t| t == entity.entity_type))
        });
        let tags_ok = self
            .tags
            .admits(|values| values.iter().any(|v| entity.has_tag(v.trim())));
        let label_ok = self.labels.admits(|values| {
            let label = entity.label.to_lowercase();
            values
                .iter()
                .map(|v| v.trim().to_lowercase())
                .any(|v| !v.is_empty() && label.contains(&v))
        });
        type_ok && tags_ok && label_ok
    }
}

/// Toggles for the label fallback chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSettings {
    pub use_subtitle: bool,
    pub use_tags: bool,
    pub use_entity_type: bool,
    pub placeholder_text: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            use_subtitle: true,
            use_tags: false,
            use_entity_type: true,
            placeholder_text: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Ranking multipliers handed to the fuzzy index through `boost_weight`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoostWeights {
    /// Matched, with the secondary record replacing native text.
    pub matched_replaced: f64,
    /// Matched, secondary record contributing metadata only.
    pub matched_metadata: f64,
    /// Unmatched native entity with its own label.
    pub labeled_native: f64,
    /// Unmatched native entity relying on the label fallback.
    pub unlabeled_native: f64,
    /// Unmatched native entity nested in another one.
    pub child_element: f64,
    /// Secondary record surfaced on its own.
    pub standalone: f64,
}

impl Default for BoostWeights {
    fn default() -> Self {
        Self {
            matched_replaced: 2.0,
            matched_metadata: 1.5,
            labeled_native: 1.0,
            unlabeled_native: 0.8,
            child_element: 0.6,
            standalone: 1.0,
        }
    }
}

impl BoostWeights {
    fn all(&self) -> [(&'static str, f64); 6] {
        [
            ("matchedReplaced", self.matched_replaced),
            ("matchedMetadata", self.matched_metadata),
            ("labeledNative", self.labeled_native),
            ("unlabeledNative", self.unlabeled_native),
            ("childElement", self.child_element),
            ("standalone", self.standalone),
        ]
    }
}

/// Tie-break rules applied when several tour entities match one secondary
/// record with the same confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreak {
    /// Prefer the candidate whose type equals the record's declared type.
    TypeHint,
    /// Prefer the candidate with the longest non-empty description.
    Description,
}

/// How business-backed results are grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessGrouping {
    /// Group by the entity's own type.
    #[default]
    EntityType,
    /// Collect every business-backed entity in the Business group.
    BusinessBucket,
}

/// Default group ordering.
pub fn default_type_priority() -> Vec<EntityType> {
    vec![
        EntityType::Panorama,
        EntityType::Hotspot,
        EntityType::Model3D,
        EntityType::Model3DObject,
        EntityType::Polygon,
        EntityType::Video,
        EntityType::Webframe,
        EntityType::Image,
        EntityType::Text,
        EntityType::ProjectedImage,
        EntityType::Element,
        EntityType::Business,
    ]
}

/// Complete configuration of the catalog engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogConfig {
    pub business: SourceSettings,
    pub sheet: SourceSettings,
    pub include_standalone_entries: bool,
    pub min_query_length: usize,
    pub wildcard_token: String,
    pub max_results: Option<usize>,
    pub filters: EntityFilters,
    pub labels: LabelSettings,
    pub boost: BoostWeights,
    pub tie_break_order: Vec<TieBreak>,
    pub business_grouping: BusinessGrouping,
    pub type_priority: Vec<EntityType>,
    pub group_labels: BTreeMap<EntityType, String>,
    pub fuzzy: FuzzyIndexConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            business: SourceSettings::default(),
            sheet: SourceSettings::default(),
            include_standalone_entries: false,
            min_query_length: 2,
            wildcard_token: DEFAULT_WILDCARD.to_string(),
            max_results: None,
            filters: EntityFilters::default(),
            labels: LabelSettings::default(),
            boost: BoostWeights::default(),
            tie_break_order: vec![TieBreak::TypeHint, TieBreak::Description],
            business_grouping: BusinessGrouping::default(),
            type_priority: default_type_priority(),
            group_labels: BTreeMap::new(),
            fuzzy: FuzzyIndexConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| PipelineError::config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, weight) in self.boost.all() {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(PipelineError::config(format!(
                    "boost weight {} must be positive, got {}",
                    name, weight
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.fuzzy.threshold) {
            return Err(PipelineError::config(format!(
                "fuzzy threshold must be within 0..=1, got {}",
                self.fuzzy.threshold
            )));
        }

        let weights = [
            self.fuzzy.label_weight,
            self.fuzzy.subtitle_weight,
            self.fuzzy.tags_weight,
            self.fuzzy.description_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || self.fuzzy.max_weight() <= 0.0 {
            return Err(PipelineError::config(
                "fuzzy field weights must be non-negative with at least one positive",
            ));
        }

        if self.wildcard_token.trim().is_empty() {
            return Err(PipelineError::config("wildcard token must not be blank"));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.tie_break_order.iter().find(|t| !seen.insert(**t)) {
            return Err(PipelineError::config(format!(
                "tie-break rule {:?} listed twice",
                dup
            )));
        }

        Ok(())
    }

    /// Heading for a result group.
    pub fn group_label(&self, entity_type: EntityType) -> String {
        self.group_labels
            .get(&entity_type)
            .cloned()
            .unwrap_or_else(|| entity_type.plural_label().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tour_search_shared::{IdentityKey, SourceKind};

    fn entity(entity_type: EntityType, label: &str, tags: &[&str]) -> CatalogEntity {
        let mut e = CatalogEntity::new(IdentityKey::new(SourceKind::Tour, label), entity_type, 1);
        e.label = label.to_string();
        e.tags = tags.iter().map(|t| t.to_string()).collect();
        e
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.type_priority.len(), EntityType::ALL.len());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CatalogConfig::from_json(
            r#"{
                "business": {"replacesNative": true},
                "includeStandaloneEntries": true,
                "filters": {"types": {"mode": "blacklist", "values": ["video"]}},
                "tieBreakOrder": ["description", "typeHint"],
                "groupLabels": {"Panorama": "Rooms"}
            }"#,
        )
        .unwrap();

        assert!(config.business.enabled);
        assert!(config.business.replaces_native);
        assert!(!config.sheet.replaces_native);
        assert!(config.include_standalone_entries);
        assert_eq!(config.min_query_length, 2);
        assert_eq!(config.tie_break_order, vec![TieBreak::Description, TieBreak::TypeHint]);
        assert_eq!(config.group_label(EntityType::Panorama), "Rooms");
        assert_eq!(config.group_label(EntityType::Video), "Videos");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CatalogConfig::default();
        config.boost.child_element = 0.0;
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.fuzzy.threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = CatalogConfig::default();
        config.tie_break_order = vec![TieBreak::TypeHint, TieBreak::TypeHint];
        assert!(config.validate().is_err());

        assert!(CatalogConfig::from_json(r#"{"minQueryLength": "two"}"#).is_err());
    }

    #[test]
    fn test_type_filters() {
        let filters = EntityFilters {
            types: FilterRule::blacklist(["Video"]),
            ..Default::default()
        };
        assert!(filters.admits(&entity(EntityType::Panorama, "Lobby", &[])));
        assert!(!filters.admits(&entity(EntityType::Video, "Intro", &[])));
    }

    #[test]
    fn test_tag_and_label_filters() {
        let filters = EntityFilters {
            tags: FilterRule::whitelist(["public"]),
            labels: FilterRule::blacklist(["staff"]),
            ..Default::default()
        };
        assert!(filters.admits(&entity(EntityType::Hotspot, "Lobby", &["Public"])));
        assert!(!filters.admits(&entity(EntityType::Hotspot, "Lobby", &["private"])));
        assert!(!filters.admits(&entity(EntityType::Hotspot, "Staff Room", &["public"])));
    }

    #[test]
    fn test_empty_rule_is_inactive() {
        let filters = EntityFilters {
            types: FilterRule::whitelist(Vec::<String>::new()),
            ..Default::default()
        };
        assert!(filters.admits(&entity(EntityType::Text, "Note", &[])));
    }
}
