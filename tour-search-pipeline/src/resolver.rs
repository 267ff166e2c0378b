//! Resolver and deduplicator.
//!
//! Turns the matcher's N-to-M candidate set into a 1:1 (or 1:0) mapping
//! between secondary records and tour entities, and decides what happens
//! to secondary records that end up without a tour entity.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::config::{EntityFilters, TieBreak};
use crate::matcher::{Candidate, MatchMethod};
use crate::merger::Merger;
use tour_search_shared::{CatalogEntity, IdentityKey, MatchConfidence};

/// Consumption bookkeeping shared by every pass of one catalog build.
///
/// Keys are not namespaced by source: once a business record's id or tag
/// has produced an accepted mapping, no sheet record bearing that id or tag
/// is matched in the later pass. A tour entity is claimed at most once
/// across all sources.
#[derive(Debug, Default, Clone)]
pub struct ConsumptionState {
    consumed_ids: HashSet<String>,
    consumed_tags: HashSet<String>,
    claimed: HashSet<usize>,
}

impl ConsumptionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the record carries an id or tag consumed by any earlier record.
    pub fn is_consumed(&self, record: &CatalogEntity) -> bool {
        let id_consumed = record.native_id.as_ref().is_some_and(|id| {
            let key = id.to_lowercase();
            self.consumed_ids.contains(&key) || self.consumed_tags.contains(&key)
        });
        id_consumed
            || record.tags.iter().any(|t| {
                let key = t.to_lowercase();
                self.consumed_tags.contains(&key) || self.consumed_ids.contains(&key)
            })
    }

    pub fn is_claimed(&self, tour_index: usize) -> bool {
        self.claimed.contains(&tour_index)
    }

    fn accept(&mut self, record: &CatalogEntity, tour_index: usize) {
        if let Some(id) = &record.native_id {
            self.consumed_ids.insert(id.to_lowercase());
        }
        for tag in &record.tags {
            self.consumed_tags.insert(tag.to_lowercase());
        }
        self.claimed.insert(tour_index);
    }
}

/// An accepted secondary-to-tour mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedMatch {
    pub tour_index: usize,
    pub secondary_index: usize,
    pub method: MatchMethod,
    pub confidence: MatchConfidence,
}

/// Outcome of resolving one secondary pool.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Resolution {
    pub accepted: Vec<AcceptedMatch>,
    /// Secondary indices without an accepted mapping, in pool order.
    pub unmatched: Vec<usize>,
    /// Number of tie-breaks needed beyond the confidence tier.
    pub ambiguous: usize,
    /// Secondary records skipped because their id or tag was already consumed.
    pub consumed: usize,
}

impl Resolution {
    /// The accepted match for a tour entity, if any.
    pub fn for_tour(&self, tour_index: usize) -> Option<&AcceptedMatch> {
        self.accepted.iter().find(|m| m.tour_index == tour_index)
    }
}

/// Emitted standalone entities plus drop statistics.
#[derive(Debug, Default)]
pub struct StandaloneOutcome {
    pub entities: Vec<CatalogEntity>,
    /// Dropped because standalone entries are disabled.
    pub disabled: usize,
    /// Dropped because their label repeats an emitted one.
    pub duplicate_labels: usize,
    /// Dropped by the entity filters.
    pub filtered: usize,
}

/// Case-insensitive registry of labels already present in the catalog.
#[derive(Debug, Default, Clone)]
pub struct LabelRegistry {
    labels: HashSet<String>,
}

impl LabelRegistry {
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(&label.to_lowercase())
    }

    pub fn insert(&mut self, label: &str) -> bool {
        self.labels.insert(label.to_lowercase())
    }
}

/// Resolver selecting at most one tour entity per secondary record.
#[derive(Debug, Clone)]
pub struct Resolver {
    tie_break_order: Vec<TieBreak>,
}

impl Resolver {
    pub fn new(tie_break_order: Vec<TieBreak>) -> Self {
        Self { tie_break_order }
    }

    /// Resolve one secondary pool against the tour entities.
    #[instrument(skip_all, fields(pool = pool.len(), candidates = candidates.len()))]
    pub fn resolve(
        &self,
        tours: &[CatalogEntity],
        pool: &[CatalogEntity],
        candidates: &[Candidate],
        state: &mut ConsumptionState,
    ) -> Resolution {
        let mut by_secondary: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();
        for candidate in candidates {
            by_secondary
                .entry(candidate.secondary_index)
                .or_default()
                .push(*candidate);
        }

        let mut resolution = Resolution::default();

        for (secondary_index, record) in pool.iter().enumerate() {
            if state.is_consumed(record) {
                debug!(
                    record = %record.identity_key,
                    "Secondary record bears an already consumed id or tag"
                );
                resolution.consumed += 1;
                resolution.unmatched.push(secondary_index);
                continue;
            }

            let mut open: Vec<Candidate> = by_secondary
                .remove(&secondary_index)
                .unwrap_or_default()
                .into_iter()
                .filter(|c| !state.is_claimed(c.tour_index))
                .collect();
            open.sort_by_key(|c| c.tour_index);

            let chosen = match open.len() {
                0 => None,
                1 => Some(open[0]),
                _ => Some(self.select(tours, record, &open, &mut resolution.ambiguous)),
            };

            match chosen {
                Some(candidate) => {
                    state.accept(record, candidate.tour_index);
                    resolution.accepted.push(AcceptedMatch {
                        tour_index: candidate.tour_index,
                        secondary_index,
                        method: candidate.method,
                        confidence: candidate.confidence,
                    });
                }
                None => resolution.unmatched.push(secondary_index),
            }
        }

        debug!(
            accepted = resolution.accepted.len(),
            unmatched = resolution.unmatched.len(),
            ambiguous = resolution.ambiguous,
            "Resolved secondary pool"
        );
        resolution
    }

    /// Pick one of several open candidates: highest tier, then the
    /// configured tie-break rules, then the first tour entity.
    fn select(
        &self,
        tours: &[CatalogEntity],
        record: &CatalogEntity,
        open: &[Candidate],
        ambiguous: &mut usize,
    ) -> Candidate {
        let best = open
            .iter()
            .map(|c| c.confidence)
            .max()
            .unwrap_or_default();
        let mut top: Vec<Candidate> = open.iter().filter(|c| c.confidence == best).copied().collect();

        if top.len() == 1 {
            return top[0];
        }

        let mut decided_by = "order";
        for rule in &self.tie_break_order {
            let narrowed = match rule {
                TieBreak::TypeHint => Self::by_type_hint(tours, record, &top),
                TieBreak::Description => Self::by_description(tours, &top),
            };
            if !narrowed.is_empty() && narrowed.len() < top.len() {
                top = narrowed;
                decided_by = match rule {
                    TieBreak::TypeHint => "type_hint",
                    TieBreak::Description => "description",
                };
            }
            if top.len() == 1 {
                break;
            }
        }

        let chosen = top[0];
        *ambiguous += 1;
        warn!(
            record = %record.identity_key,
            confidence = best.tier(),
            candidates = open.len(),
            chosen = %tours[chosen.tour_index].identity_key,
            decided_by,
            "Ambiguous match resolved by tie-break"
        );
        chosen
    }

    fn by_type_hint(tours: &[CatalogEntity], record: &CatalogEntity, top: &[Candidate]) -> Vec<Candidate> {
        match record.type_hint {
            Some(hint) => top
                .iter()
                .filter(|c| tours[c.tour_index].entity_type == hint)
                .copied()
                .collect(),
            None => Vec::new(),
        }
    }

    fn by_description(tours: &[CatalogEntity], top: &[Candidate]) -> Vec<Candidate> {
        let length = |c: &Candidate| tours[c.tour_index].subtitle.trim().chars().count();
        let longest = top.iter().map(length).max().unwrap_or(0);
        if longest == 0 {
            return Vec::new();
        }
        top.iter().filter(|c| length(*c) == longest).copied().collect()
    }

    /// Turn unmatched secondary records into standalone catalog entries.
    ///
    /// Records are dropped when standalone entries are disabled, when their
    /// derived label repeats (case-insensitively) one already in `labels`,
    /// when the filters reject them, or when their key is already taken.
    pub fn emit_standalone(
        &self,
        pool: &[CatalogEntity],
        unmatched: &[usize],
        include_standalone: bool,
        merger: &Merger<'_>,
        filters: &EntityFilters,
        labels: &mut LabelRegistry,
        keys: &mut HashSet<IdentityKey>,
    ) -> StandaloneOutcome {
        let mut outcome = StandaloneOutcome::default();

        for &index in unmatched {
            if !include_standalone {
                outcome.disabled += 1;
                continue;
            }

            let entity = merger.finalize_standalone(pool[index].clone());

            if labels.contains(&entity.label) {
                debug!(
                    record = %entity.identity_key,
                    label = %entity.label,
                    "Dropping unmatched record with duplicate label"
                );
                outcome.duplicate_labels += 1;
                continue;
            }
            if !filters.admits(&entity) {
                outcome.filtered += 1;
                continue;
            }
            if !keys.insert(entity.identity_key.clone()) {
                debug!(record = %entity.identity_key, "Dropping unmatched record with repeated key");
                outcome.duplicate_labels += 1;
                continue;
            }

            labels.insert(&entity.label);
            outcome.entities.push(entity);
        }

        outcome
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(vec![TieBreak::TypeHint, TieBreak::Description])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::matcher::CrossSourceMatcher;
    use crate::normalizer::EntityNormalizer;
    use tour_search_shared::{BusinessRecord, EntityType, SheetRecord, TourRecord};

    fn tours(records: Vec<TourRecord>) -> Vec<CatalogEntity> {
        EntityNormalizer::new().normalize_tour_batch(records)
    }

    fn sheet(rows: &[SheetRecord]) -> Vec<CatalogEntity> {
        EntityNormalizer::new().normalize_sheet_batch(rows, 100)
    }

    fn resolve(
        resolver: &Resolver,
        tours: &[CatalogEntity],
        pool: &[CatalogEntity],
        state: &mut ConsumptionState,
    ) -> Resolution {
        let candidates = CrossSourceMatcher::new().match_all(tours, pool);
        resolver.resolve(tours, pool, &candidates, state)
    }

    #[test]
    fn test_single_candidate_is_accepted() {
        let tours = tours(vec![TourRecord::new("Room-1", "").with_tags(["Room-1"])]);
        let pool = EntityNormalizer::new()
            .normalize_business_batch(&[BusinessRecord::new("Room-1", "Main Room 1")], 1);

        let resolution = resolve(&Resolver::default(), &tours, &pool, &mut ConsumptionState::new());

        assert_eq!(resolution.accepted.len(), 1);
        assert_eq!(resolution.accepted[0].confidence, MatchConfidence::Exact);
        assert!(resolution.unmatched.is_empty());
        assert_eq!(resolution.ambiguous, 0);
    }

    #[test]
    fn test_highest_tier_wins() {
        let tours = tours(vec![
            TourRecord::new("a", "Gallery").with_tags(["art"]),
            TourRecord::new("b", "Other").with_tags(["x"]),
        ]);
        let mut row = SheetRecord::new("b", "", "Gallery");
        row.tag = "art".to_string();
        let pool = sheet(&[row]);

        let resolution = resolve(&Resolver::default(), &tours, &pool, &mut ConsumptionState::new());

        assert_eq!(resolution.accepted[0].tour_index, 1);
        assert_eq!(resolution.ambiguous, 0);
    }

    #[test]
    fn test_secondary_matching_two_tours_attaches_once() {
        let tours = tours(vec![
            TourRecord::new("a", "A").with_tags(["shop"]),
            TourRecord::new("b", "B").with_tags(["shop"]),
        ]);
        let pool = sheet(&[SheetRecord::new("shop", "", "Shop")]);

        let resolution = resolve(&Resolver::default(), &tours, &pool, &mut ConsumptionState::new());

        assert_eq!(resolution.accepted.len(), 1);
        assert_eq!(resolution.accepted[0].tour_index, 0);
        assert_eq!(resolution.ambiguous, 1);
        assert!(resolution.for_tour(1).is_none());
    }

    #[test]
    fn test_type_hint_breaks_ties() {
        let tours = tours(vec![
            TourRecord::new("a", "A").with_tags(["bar"]).with_type_hint("PanoramaPlayListItem"),
            TourRecord::new("b", "B").with_tags(["bar"]).with_type_hint("HotspotPanoramaOverlay"),
        ]);
        let mut row = SheetRecord::new("", "bar", "Bar");
        row.element_type = Some("Hotspot".to_string());
        let pool = sheet(&[row]);

        let resolution = resolve(&Resolver::default(), &tours, &pool, &mut ConsumptionState::new());

        assert_eq!(resolution.accepted[0].tour_index, 1);
        assert_eq!(tours[1].entity_type, EntityType::Hotspot);
    }

    #[test]
    fn test_description_breaks_ties_and_order_is_configurable() {
        let mut described = TourRecord::new("b", "B").with_tags(["bar"]);
        described.subtitle = "Cocktails on the roof".to_string();
        let tours = tours(vec![
            TourRecord::new("a", "A").with_tags(["bar"]).with_type_hint("HotspotPanoramaOverlay"),
            described,
        ]);
        let mut row = SheetRecord::new("", "bar", "Bar");
        row.element_type = Some("Hotspot".to_string());
        let pool = sheet(&[row]);

        let type_first = resolve(&Resolver::default(), &tours, &pool, &mut ConsumptionState::new());
        assert_eq!(type_first.accepted[0].tour_index, 0);

        let description_first = Resolver::new(vec![TieBreak::Description, TieBreak::TypeHint]);
        let resolution = resolve(&description_first, &tours, &pool, &mut ConsumptionState::new());
        assert_eq!(resolution.accepted[0].tour_index, 1);
    }

    #[test]
    fn test_consumed_tag_is_not_reprocessed() {
        let tours = tours(vec![
            TourRecord::new("a", "A").with_tags(["MyCoolTag_01"]),
            TourRecord::new("b", "B").with_tags(["MyCoolTag_01"]),
        ]);
        let pool = sheet(&[
            SheetRecord::new("", "MyCoolTag_01", "First"),
            SheetRecord::new("", "MyCoolTag_01", "Second"),
        ]);

        let resolution = resolve(&Resolver::default(), &tours, &pool, &mut ConsumptionState::new());

        assert_eq!(resolution.accepted.len(), 1);
        assert_eq!(resolution.unmatched, vec![1]);
        assert_eq!(resolution.consumed, 1);
    }

    #[test]
    fn test_consumption_persists_across_passes() {
        let tours = tours(vec![TourRecord::new("a", "A").with_tags(["x"])]);
        let mut state = ConsumptionState::new();
        let resolver = Resolver::default();

        let first = resolve(&resolver, &tours, &sheet(&[SheetRecord::new("", "x", "One")]), &mut state);
        assert_eq!(first.accepted.len(), 1);

        let second = resolve(&resolver, &tours, &sheet(&[SheetRecord::new("", "X", "Two")]), &mut state);
        assert!(second.accepted.is_empty());
        assert_eq!(second.consumed, 1);
        assert!(state.is_claimed(0));
    }

    #[test]
    fn test_business_consumption_carries_into_sheet_pass() {
        let tours = tours(vec![
            TourRecord::new("t1", "").with_tags(["shared"]),
            TourRecord::new("t2", "").with_tags(["other"]),
        ]);
        let mut state = ConsumptionState::new();
        let resolver = Resolver::default();

        let mut cafe = BusinessRecord::new("", "Cafe Aurora");
        cafe.match_tags = vec!["shared".to_string()];
        let business = EntityNormalizer::new().normalize_business_batch(&[cafe], 1);
        let first = resolve(&resolver, &tours, &business, &mut state);
        assert_eq!(first.accepted[0].tour_index, 0);

        let second = resolve(
            &resolver,
            &tours,
            &sheet(&[SheetRecord::new("", "SHARED", "Unrelated Kiosk")]),
            &mut state,
        );
        assert!(second.accepted.is_empty());
        assert_eq!(second.unmatched, vec![0]);
        assert_eq!(second.consumed, 1);
    }

    #[test]
    fn test_claimed_tour_is_skipped_by_later_source() {
        let tours = tours(vec![TourRecord::new("Room-1", "").with_tags(["Room-1", "bar"])]);
        let mut state = ConsumptionState::new();
        let resolver = Resolver::default();

        let business = EntityNormalizer::new()
            .normalize_business_batch(&[BusinessRecord::new("Room-1", "Main Room 1")], 1);
        assert_eq!(resolve(&resolver, &tours, &business, &mut state).accepted.len(), 1);

        let second = resolve(&resolver, &tours, &sheet(&[SheetRecord::new("", "bar", "Bar")]), &mut state);
        assert!(second.accepted.is_empty());
        assert_eq!(second.consumed, 0);
        assert_eq!(second.unmatched, vec![0]);
    }

    #[test]
    fn test_emit_standalone_drops_duplicate_labels() {
        let config = CatalogConfig::default();
        let merger = Merger::new(&config);
        let pool = sheet(&[
            SheetRecord::new("s1", "", "Gift Shop"),
            SheetRecord::new("s2", "", "gift shop"),
            SheetRecord::new("s3", "", "Lobby"),
        ]);
        let mut labels = LabelRegistry::default();
        labels.insert("LOBBY");
        let mut keys = HashSet::new();

        let outcome = Resolver::default().emit_standalone(
            &pool,
            &[0, 1, 2],
            true,
            &merger,
            &config.filters,
            &mut labels,
            &mut keys,
        );

        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.duplicate_labels, 2);
        assert!(outcome.entities[0].is_standalone);
        assert_eq!(outcome.entities[0].match_confidence, MatchConfidence::None);
    }

    #[test]
    fn test_emit_standalone_disabled() {
        let config = CatalogConfig::default();
        let merger = Merger::new(&config);
        let pool = sheet(&[SheetRecord::new("s1", "", "Gift Shop")]);

        let outcome = Resolver::default().emit_standalone(
            &pool,
            &[0],
            false,
            &merger,
            &config.filters,
            &mut LabelRegistry::default(),
            &mut HashSet::new(),
        );

        assert!(outcome.entities.is_empty());
        assert_eq!(outcome.disabled, 1);
    }
}
