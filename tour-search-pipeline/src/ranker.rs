//! Query result ranker.
//!
//! Groups fuzzy hits by entity type and orders groups and entries for
//! display. Score decides which entities are shown; display order inside a
//! group follows the tour's playlist.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::config::{BusinessGrouping, CatalogConfig};
use tour_search_shared::{Catalog, CatalogEntity, EntityType, FuzzyMatch, ResultEntry, ResultGroup};

fn entry_order(a: &ResultEntry<'_>, b: &ResultEntry<'_>) -> Ordering {
    let playlist = match (a.entity.playlist_order, b.entity.playlist_order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    playlist
        .then_with(|| a.entity.label.cmp(&b.entity.label))
        .then_with(|| a.parent_label.cmp(&b.parent_label))
        .then_with(|| a.entity.identity_key.cmp(&b.entity.identity_key))
}

/// Ranker turning raw index hits into ordered display groups.
#[derive(Debug, Clone, Copy)]
pub struct ResultRanker<'c> {
    config: &'c CatalogConfig,
}

impl<'c> ResultRanker<'c> {
    pub fn new(config: &'c CatalogConfig) -> Self {
        Self { config }
    }

    /// Group an entity is shown under.
    fn group_type(&self, entity: &CatalogEntity) -> EntityType {
        match self.config.business_grouping {
            BusinessGrouping::BusinessBucket if entity.is_business_backed() => EntityType::Business,
            _ => entity.entity_type,
        }
    }

    fn priority(&self, entity_type: EntityType) -> usize {
        self.config
            .type_priority
            .iter()
            .position(|t| *t == entity_type)
            .unwrap_or(usize::MAX)
    }

    /// Group and order the hits of one query.
    ///
    /// Hits whose key is not in the catalog are ignored. Groups follow the
    /// configured type priority; types missing from it come last, in the
    /// order they were first seen.
    pub fn rank<'a>(&self, catalog: &'a Catalog, matches: Vec<FuzzyMatch>) -> Vec<ResultGroup<'a>> {
        let mut groups: Vec<ResultGroup<'a>> = Vec::new();
        let mut slots: HashMap<EntityType, usize> = HashMap::new();

        for hit in matches {
            let Some(entity) = catalog.get(&hit.key) else {
                debug!(key = %hit.key, "Ignoring hit outside the catalog");
                continue;
            };

            let entity_type = self.group_type(entity);
            let slot = *slots.entry(entity_type).or_insert_with(|| {
                groups.push(ResultGroup::new(entity_type, self.config.group_label(entity_type)));
                groups.len() - 1
            });

            groups[slot].push(ResultEntry {
                entity,
                score: hit.score,
                highlights: hit.highlights,
                parent_label: catalog.parent_of(entity).map(|p| p.label.as_str()),
            });
        }

        for group in &mut groups {
            group.entries.sort_by(entry_order);
        }
        groups.sort_by_key(|g| self.priority(g.entity_type));
        groups
    }
}
