//! The frozen, searchable catalog.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::entity::{CatalogEntity, IdentityKey};

/// An immutable, flat list of catalog entities.
///
/// A catalog is only ever constructed through [`Catalog::freeze`], which
/// enforces the structural invariants: identity keys are unique and every
/// `parent_ref` resolves to another entity of the same catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<CatalogEntity>,
    index: HashMap<IdentityKey, usize>,
    built_at: DateTime<Utc>,
}

impl Catalog {
    /// A catalog that matches nothing.
    pub fn empty() -> Self {
        Self::freeze(Vec::new(), Utc::now())
    }

    /// Freeze a list of entities into a catalog.
    ///
    /// Later entities repeating an identity key are discarded and parent
    /// references that do not resolve are cleared.
    pub fn freeze(entities: Vec<CatalogEntity>, built_at: DateTime<Utc>) -> Self {
        let mut seen = HashSet::with_capacity(entities.len());
        let mut kept: Vec<CatalogEntity> = entities
            .into_iter()
            .filter(|e| seen.insert(e.identity_key.clone()))
            .collect();

        for entity in kept.iter_mut() {
            let dangling = entity
                .parent_ref
                .as_ref()
                .is_some_and(|p| !seen.contains(p) || *p == entity.identity_key);
            if dangling {
                entity.parent_ref = None;
            }
        }

        let index = kept
            .iter()
            .enumerate()
            .map(|(i, e)| (e.identity_key.clone(), i))
            .collect();

        Self {
            entities: kept,
            index,
            built_at,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[CatalogEntity] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntity> {
        self.entities.iter()
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&CatalogEntity> {
        self.index.get(key).map(|&i| &self.entities[i])
    }

    /// Position of an entity in catalog order.
    pub fn position(&self, key: &IdentityKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// The containing entity, if any.
    pub fn parent_of(&self, entity: &CatalogEntity) -> Option<&CatalogEntity> {
        entity.parent_ref.as_ref().and_then(|p| self.get(p))
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityType, SourceKind};

    fn entity(id: &str, parent: Option<&str>) -> CatalogEntity {
        let mut e = CatalogEntity::new(
            IdentityKey::new(SourceKind::Tour, id),
            EntityType::Hotspot,
            1,
        );
        e.label = id.to_string();
        e.parent_ref = parent.map(|p| IdentityKey::new(SourceKind::Tour, p));
        e
    }

    #[test]
    fn test_freeze_drops_duplicate_keys() {
        let mut second = entity("a", None);
        second.label = "duplicate".to_string();

        let catalog = Catalog::freeze(vec![entity("a", None), second, entity("b", None)], Utc::now());

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(&IdentityKey::new(SourceKind::Tour, "a")).unwrap().label, "a");
        assert_eq!(catalog.position(&IdentityKey::new(SourceKind::Tour, "b")), Some(1));
    }

    #[test]
    fn test_freeze_clears_dangling_parents() {
        let catalog = Catalog::freeze(
            vec![
                entity("pano", None),
                entity("hs-1", Some("pano")),
                entity("hs-2", Some("missing")),
            ],
            Utc::now(),
        );

        let hs1 = catalog.get(&IdentityKey::new(SourceKind::Tour, "hs-1")).unwrap();
        assert_eq!(catalog.parent_of(hs1).map(|p| p.label.as_str()), Some("pano"));

        let hs2 = catalog.get(&IdentityKey::new(SourceKind::Tour, "hs-2")).unwrap();
        assert!(hs2.parent_ref.is_none());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert!(catalog.get(&IdentityKey::new(SourceKind::Tour, "x")).is_none());
    }
}
