//! Result types exchanged with the fuzzy index and the rendering side.

use std::ops::Range;

use serde::Serialize;

use crate::entity::{CatalogEntity, EntityType, IdentityKey};

/// A raw hit reported by the fuzzy-match index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch {
    /// The matched entity.
    pub key: IdentityKey,
    /// Similarity score; higher is better, zero for wildcard listings.
    pub score: f64,
    /// Byte ranges of the entity label to highlight.
    pub highlights: Vec<Range<usize>>,
}

impl FuzzyMatch {
    pub fn new(key: IdentityKey, score: f64) -> Self {
        Self {
            key,
            score,
            highlights: Vec::new(),
        }
    }
}

/// One row of a result group.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry<'a> {
    pub entity: &'a CatalogEntity,
    pub score: f64,
    pub highlights: Vec<Range<usize>>,
    pub parent_label: Option<&'a str>,
}

/// A display-ready group of results sharing one entity type.
#[derive(Debug, Clone, Serialize)]
pub struct ResultGroup<'a> {
    pub entity_type: EntityType,
    pub label: String,
    pub count: usize,
    pub entries: Vec<ResultEntry<'a>>,
}

impl<'a> ResultGroup<'a> {
    pub fn new(entity_type: EntityType, label: impl Into<String>) -> Self {
        Self {
            entity_type,
            label: label.into(),
            count: 0,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ResultEntry<'a>) {
        self.entries.push(entry);
        self.count = self.entries.len();
    }
}
