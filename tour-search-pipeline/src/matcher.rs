//! Cross-source matcher.
//!
//! Finds every secondary record that plausibly refers to the same place as
//! a tour entity. Strategies are tried in priority order and only the best
//! one is reported per pair:
//!
//! 1. identity: the secondary id equals the tour native id or media id
//! 2. tags: the secondary tags or id intersect the tour tags (case-insensitive)
//! 3. label: the secondary name equals the tour label (case-insensitive)
//!
//! The matcher never filters or selects; that is the resolver's job.

use std::collections::HashSet;

use tracing::{debug, instrument};

use tour_search_shared::{CatalogEntity, MatchConfidence};

/// Strategy that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    IdentityKey,
    TagIntersection,
    LabelEquality,
}

impl MatchMethod {
    pub fn confidence(&self) -> MatchConfidence {
        match self {
            MatchMethod::IdentityKey => MatchConfidence::Exact,
            MatchMethod::TagIntersection => MatchConfidence::Medium,
            MatchMethod::LabelEquality => MatchConfidence::Weak,
        }
    }
}

/// A possible correspondence between a tour entity and a secondary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Index into the tour entity list.
    pub tour_index: usize,
    /// Index into the secondary pool.
    pub secondary_index: usize,
    pub method: MatchMethod,
    pub confidence: MatchConfidence,
}

/// Precomputed comparison keys of one secondary record.
struct SecondaryKeys<'a> {
    id: Option<&'a str>,
    tag_keys: HashSet<String>,
    name: Option<String>,
}

impl<'a> SecondaryKeys<'a> {
    fn of(entity: &'a CatalogEntity) -> Self {
        let id = entity.native_id.as_deref();
        let tag_keys = entity
            .tags
            .iter()
            .map(String::as_str)
            .chain(id)
            .map(str::to_lowercase)
            .collect();
        let name = (!entity.original_label.is_empty()).then(|| entity.original_label.to_lowercase());
        Self { id, tag_keys, name }
    }

    fn best_method(&self, target: &CatalogEntity, target_tags: &HashSet<String>) -> Option<MatchMethod> {
        if let Some(id) = self.id {
            if target.native_id.as_deref() == Some(id) || target.media_id.as_deref() == Some(id) {
                return Some(MatchMethod::IdentityKey);
            }
        }

        if !self.tag_keys.is_disjoint(target_tags) {
            return Some(MatchMethod::TagIntersection);
        }

        match &self.name {
            Some(name) if !target.original_label.is_empty() && *name == target.original_label.to_lowercase() => {
                Some(MatchMethod::LabelEquality)
            }
            _ => None,
        }
    }
}

fn lowercase_tags(entity: &CatalogEntity) -> HashSet<String> {
    entity.tags.iter().map(|t| t.to_lowercase()).collect()
}

/// Matcher producing candidate pairs between tour entities and a secondary pool.
#[derive(Debug, Default, Clone)]
pub struct CrossSourceMatcher {}

impl CrossSourceMatcher {
    pub fn new() -> Self {
        Self {}
    }

    /// All secondary records in `pool` that may refer to `target`.
    pub fn find_candidates(
        &self,
        target: &CatalogEntity,
        target_index: usize,
        pool: &[CatalogEntity],
    ) -> Vec<Candidate> {
        let keys: Vec<SecondaryKeys<'_>> = pool.iter().map(SecondaryKeys::of).collect();
        Self::candidates_for(target, target_index, &keys)
    }

    /// Candidate pairs for every tour entity, in tour order then pool order.
    #[instrument(skip(self, tours, pool), fields(tours = tours.len(), pool = pool.len()))]
    pub fn match_all(&self, tours: &[CatalogEntity], pool: &[CatalogEntity]) -> Vec<Candidate> {
        if pool.is_empty() {
            return Vec::new();
        }

        let keys: Vec<SecondaryKeys<'_>> = pool.iter().map(SecondaryKeys::of).collect();
        let candidates: Vec<Candidate> = tours
            .iter()
            .enumerate()
            .flat_map(|(index, target)| Self::candidates_for(target, index, &keys))
            .collect();

        debug!(candidates = candidates.len(), "Matched secondary pool");
        candidates
    }

    fn candidates_for(
        target: &CatalogEntity,
        target_index: usize,
        keys: &[SecondaryKeys<'_>],
    ) -> Vec<Candidate> {
        let target_tags = lowercase_tags(target);
        keys.iter()
            .enumerate()
            .filter_map(|(secondary_index, k)| {
                k.best_method(target, &target_tags).map(|method| Candidate {
                    tour_index: target_index,
                    secondary_index,
                    method,
                    confidence: method.confidence(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::EntityNormalizer;
    use tour_search_shared::{BusinessRecord, SheetRecord, TourRecord};

    fn tour(id: &str, label: &str, tags: &[&str]) -> CatalogEntity {
        EntityNormalizer::new()
            .normalize_tour(TourRecord::new(id, label).with_tags(tags.iter().copied()), 1)
            .unwrap()
    }

    fn business(id: &str, name: &str, tags: &[&str]) -> CatalogEntity {
        let mut record = BusinessRecord::new(id, name);
        record.match_tags = tags.iter().map(|t| t.to_string()).collect();
        EntityNormalizer::new().normalize_business(&record, 1, 100).unwrap()
    }

    #[test]
    fn test_identity_match_beats_tag_match() {
        let matcher = CrossSourceMatcher::new();
        let target = tour("Room-1", "", &["Room-1"]);
        let pool = vec![business("Room-1", "Main Room 1", &[])];

        let candidates = matcher.find_candidates(&target, 0, &pool);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].method, MatchMethod::IdentityKey);
        assert_eq!(candidates[0].confidence, MatchConfidence::Exact);
    }

    #[test]
    fn test_media_id_counts_as_identity() {
        let matcher = CrossSourceMatcher::new();
        let mut target = tour("overlay_17", "Lobby", &[]);
        target.media_id = Some("media_lobby".to_string());

        let candidates = matcher.find_candidates(&target, 0, &[business("media_lobby", "", &["x"])]);
        assert_eq!(candidates[0].method, MatchMethod::IdentityKey);
    }

    #[test]
    fn test_tag_intersection_is_case_insensitive() {
        let matcher = CrossSourceMatcher::new();
        let target = tour("p1", "Lobby", &["MyCoolTag_01"]);
        let row = EntityNormalizer::new()
            .normalize_sheet(&SheetRecord::new("", "mycooltag_01", "Tagged Cool Tag"), 1, 10)
            .unwrap();

        let candidates = matcher.find_candidates(&target, 0, &[row]);
        assert_eq!(candidates[0].method, MatchMethod::TagIntersection);
        assert_eq!(candidates[0].confidence, MatchConfidence::Medium);
    }

    #[test]
    fn test_secondary_id_matches_tour_tags() {
        let matcher = CrossSourceMatcher::new();
        let tours = vec![tour("a", "A", &["shop"]), tour("b", "B", &["SHOP"])];
        let pool = vec![business("shop", "Shop", &[])];

        let candidates = matcher.match_all(&tours, &pool);

        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.method == MatchMethod::TagIntersection));
        assert_eq!(candidates[0].tour_index, 0);
        assert_eq!(candidates[1].tour_index, 1);
    }

    #[test]
    fn test_label_equality_is_weakest() {
        let matcher = CrossSourceMatcher::new();
        let target = tour("p1", "Roof Terrace", &[]);

        let candidates = matcher.find_candidates(&target, 0, &[business("", "roof terrace", &[])]);
        assert_eq!(candidates[0].method, MatchMethod::LabelEquality);
        assert_eq!(candidates[0].confidence, MatchConfidence::Weak);
    }

    #[test]
    fn test_no_match_and_blank_labels() {
        let matcher = CrossSourceMatcher::new();
        let target = tour("p1", "", &[]);

        assert!(matcher.find_candidates(&target, 0, &[business("", "", &["x"])]).is_empty());
        assert!(matcher.match_all(&[target], &[]).is_empty());
    }
}
