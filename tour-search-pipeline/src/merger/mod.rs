//! Merger.
//!
//! Combines a tour entity with the secondary records the resolver attached
//! to it, and finalizes secondary records that are surfaced on their own.

mod label;

pub use label::resolve_label;

use crate::config::CatalogConfig;
use tour_search_shared::{CatalogEntity, MatchConfidence, SourceKind};

/// A secondary record accepted for a tour entity, with the confidence of
/// the mapping.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRecord<'a> {
    pub record: &'a CatalogEntity,
    pub confidence: MatchConfidence,
}

impl<'a> MatchedRecord<'a> {
    pub fn new(record: &'a CatalogEntity, confidence: MatchConfidence) -> Self {
        Self { record, confidence }
    }
}

/// Merger applying the configured override policy and boost weights.
#[derive(Debug, Clone, Copy)]
pub struct Merger<'c> {
    config: &'c CatalogConfig,
}

impl<'c> Merger<'c> {
    pub fn new(config: &'c CatalogConfig) -> Self {
        Self { config }
    }

    /// Merge a tour entity with its matched business and sheet records.
    ///
    /// A catalog build claims each tour entity once, so at most one of
    /// `business` and `sheet` is set there. When both are given, business
    /// fields take precedence.
    ///
    /// # Arguments
    ///
    /// * `tour` - The native tour entity
    /// * `business` - Business record attached to it, if any
    /// * `sheet` - Sheet record attached to it, if any
    ///
    /// # Returns
    ///
    /// The merged entity, keeping the tour entity's identity and navigation.
    pub fn merge(
        &self,
        tour: &CatalogEntity,
        business: Option<MatchedRecord<'_>>,
        sheet: Option<MatchedRecord<'_>>,
    ) -> CatalogEntity {
        let mut merged = tour.clone();
        let matches: Vec<(SourceKind, MatchedRecord<'_>, bool)> = [
            business.map(|m| (SourceKind::Business, m, self.config.business.replaces_native)),
            sheet.map(|m| (SourceKind::Sheet, m, self.config.sheet.replaces_native)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let replacing = matches.iter().find(|(_, _, replaces)| *replaces).map(|(_, m, _)| m.record);
        if let Some(record) = replacing {
            if !record.label.trim().is_empty() {
                merged.label = record.label.clone();
            }
            if !record.subtitle.trim().is_empty() {
                merged.subtitle = record.subtitle.clone();
            }
        }

        for (source, matched, _) in &matches {
            let record = matched.record;
            merged.matched_sources.push(*source);

            if merged.description.is_none() {
                merged.description = record.description.clone();
            }
            if merged.type_hint.is_none() {
                merged.type_hint = record.type_hint;
            }
            for tag in &record.tags {
                if !merged.has_tag(tag) {
                    merged.tags.push(tag.clone());
                }
            }
        }

        merged.image_ref = matches
            .iter()
            .find_map(|(_, m, _)| m.record.image_ref.clone())
            .or_else(|| tour.image_ref.clone());

        merged.match_confidence = matches
            .iter()
            .map(|(_, m, _)| m.confidence)
            .max()
            .unwrap_or(MatchConfidence::Exact);

        let boost = &self.config.boost;
        merged.boost_weight = if replacing.is_some() {
            boost.matched_replaced
        } else if !matches.is_empty() {
            boost.matched_metadata
        } else if merged.parent_ref.is_some() {
            boost.child_element
        } else if !merged.label.trim().is_empty() {
            boost.labeled_native
        } else {
            boost.unlabeled_native
        };

        merged.label = resolve_label(&merged, &self.config.labels);
        merged
    }

    /// Turn an unmatched secondary record into a standalone catalog entry.
    pub fn finalize_standalone(&self, mut entity: CatalogEntity) -> CatalogEntity {
        entity.is_standalone = true;
        entity.match_confidence = MatchConfidence::None;
        entity.navigation_ref = None;
        entity.boost_weight = self.config.boost.standalone;
        entity.label = resolve_label(&entity, &self.config.labels);
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSettings;
    use crate::normalizer::EntityNormalizer;
    use tour_search_shared::{BusinessRecord, NavigationHandle, SheetRecord, TourRecord};

    fn tour(record: TourRecord) -> CatalogEntity {
        EntityNormalizer::new().normalize_tour(record, 1).unwrap()
    }

    #[test]
    fn test_business_replaces_native_label() {
        let config = CatalogConfig {
            business: SourceSettings {
                enabled: true,
                replaces_native: true,
            },
            ..Default::default()
        };
        let room = tour(TourRecord::new("Room-1", "").with_tags(["Room-1"]));
        let record = EntityNormalizer::new()
            .normalize_business(&BusinessRecord::new("Room-1", "Main Room 1"), 1, 10)
            .unwrap();

        let merged = Merger::new(&config).merge(
            &room,
            Some(MatchedRecord::new(&record, MatchConfidence::Exact)),
            None,
        );

        assert_eq!(merged.label, "Main Room 1");
        assert_eq!(merged.match_confidence.tier(), 3);
        assert_eq!(merged.matched_sources, vec![SourceKind::Business]);
        assert_eq!(merged.boost_weight, config.boost.matched_replaced);
        assert_eq!(merged.identity_key, room.identity_key);
    }

    #[test]
    fn test_sheet_metadata_keeps_native_label() {
        let config = CatalogConfig::default();
        let mut record = TourRecord::new("p1", "Lobby").with_tags(["MyCoolTag_01"]);
        record.thumbnail = Some("lobby-thumb.jpg".to_string());
        let lobby = tour(record);
        let mut row = SheetRecord::new("", "MyCoolTag_01", "Tagged Cool Tag");
        row.image_url = Some("https://cdn.example.com/cool.png".to_string());
        let row = EntityNormalizer::new().normalize_sheet(&row, 1, 10).unwrap();

        let merged = Merger::new(&config).merge(
            &lobby,
            None,
            Some(MatchedRecord::new(&row, MatchConfidence::Medium)),
        );

        assert_eq!(merged.label, "Lobby");
        assert_eq!(merged.image_ref.as_deref(), Some("https://cdn.example.com/cool.png"));
        assert_eq!(merged.match_confidence, MatchConfidence::Medium);
        assert_eq!(merged.boost_weight, config.boost.matched_metadata);
    }

    #[test]
    fn test_business_wins_over_sheet() {
        let both_replace = SourceSettings {
            enabled: true,
            replaces_native: true,
        };
        let config = CatalogConfig {
            business: both_replace.clone(),
            sheet: both_replace,
            ..Default::default()
        };
        let normalizer = EntityNormalizer::new();
        let room = tour(TourRecord::new("r", "Room"));
        let mut business = BusinessRecord::new("r", "Cafe");
        business.image_url = Some("cafe.jpg".to_string());
        let business = normalizer.normalize_business(&business, 1, 10).unwrap();
        let mut sheet = SheetRecord::new("r", "", "Coffee Corner");
        sheet.description = "Open daily".to_string();
        sheet.image_url = Some("corner.jpg".to_string());
        let sheet = normalizer.normalize_sheet(&sheet, 1, 10).unwrap();

        let merged = Merger::new(&config).merge(
            &room,
            Some(MatchedRecord::new(&business, MatchConfidence::Weak)),
            Some(MatchedRecord::new(&sheet, MatchConfidence::Exact)),
        );

        assert_eq!(merged.label, "Cafe");
        assert_eq!(merged.image_ref.as_deref(), Some("cafe.jpg"));
        assert_eq!(merged.description.as_deref(), Some("Open daily"));
        assert_eq!(merged.match_confidence, MatchConfidence::Exact);
        assert_eq!(merged.matched_sources, vec![SourceKind::Business, SourceKind::Sheet]);
    }

    #[test]
    fn test_unmatched_native_boosts() {
        let config = CatalogConfig::default();
        let merger = Merger::new(&config);

        let labeled = merger.merge(&tour(TourRecord::new("a", "Lobby")), None, None);
        assert_eq!(labeled.boost_weight, config.boost.labeled_native);
        assert_eq!(labeled.match_confidence, MatchConfidence::Exact);

        let unlabeled = merger.merge(&tour(TourRecord::new("b", "")), None, None);
        assert_eq!(unlabeled.boost_weight, config.boost.unlabeled_native);
        assert_eq!(unlabeled.label, "Element (b)");

        let child = merger.merge(&tour(TourRecord::new("c", "Door").with_parent("a")), None, None);
        assert_eq!(child.boost_weight, config.boost.child_element);
    }

    #[test]
    fn test_finalize_standalone() {
        let config = CatalogConfig::default();
        let mut row = EntityNormalizer::new()
            .normalize_sheet(&SheetRecord::new("", "x", ""), 4, 10)
            .unwrap();
        row.navigation_ref = Some(NavigationHandle::new("nav"));

        let standalone = Merger::new(&config).finalize_standalone(row);

        assert!(standalone.is_standalone);
        assert!(standalone.navigation_ref.is_none());
        assert_eq!(standalone.match_confidence, MatchConfidence::None);
        assert_eq!(standalone.label, "Business 4");
        assert_eq!(standalone.playlist_order, Some(13));
    }
}
