//! Entity normalizer.
//!
//! Converts raw records from each source into the common [`CatalogEntity`]
//! shape. Normalization is a pure transform: malformed records are reported
//! as [`NormalizeError`] by the single-record functions and dropped (with a
//! warning) by the batch functions, which never fail.

mod type_detection;

pub use type_detection::{detect_type, type_from_class_hint, type_from_label, type_from_properties};

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::errors::NormalizeError;
use tour_search_shared::{
    BusinessRecord, CatalogEntity, EntityType, IdentityKey, SheetRecord, SourceKind, TourRecord,
};

fn clean(text: &str) -> String {
    text.trim().to_string()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn clean_optional(text: Option<&str>) -> Option<String> {
    text.and_then(non_empty)
}

/// Trim tags, drop blanks and exact duplicates, keep first-seen order.
fn clean_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty() && seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Synthetic playlist position for the `index`-th secondary record.
fn secondary_order(order_base: u32, index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| order_base.saturating_add(i))
}

/// Fields shared by business and sheet records.
struct SecondaryFields<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    tags: Vec<String>,
    image_ref: Option<String>,
    element_type: Option<&'a str>,
    parent_id: Option<&'a str>,
}

/// Normalizer that turns raw source records into catalog entities.
#[derive(Debug, Default, Clone)]
pub struct EntityNormalizer {}

impl EntityNormalizer {
    /// Create a new entity normalizer.
    pub fn new() -> Self {
        Self {}
    }

    /// Normalize one native tour record. `ordinal` is 1-based.
    pub fn normalize_tour(
        &self,
        record: TourRecord,
        ordinal: usize,
    ) -> Result<CatalogEntity, NormalizeError> {
        let native_id = non_empty(&record.native_id).ok_or(NormalizeError::MissingIdentity {
            source_kind: SourceKind::Tour,
            ordinal,
        })?;

        let label = clean(&record.label);
        let entity_type = detect_type(
            record.entity_type_hint.as_deref(),
            &record.properties,
            &label,
        );

        let mut entity = CatalogEntity::new(
            IdentityKey::new(SourceKind::Tour, native_id.clone()),
            entity_type,
            ordinal,
        );
        entity.native_id = Some(native_id);
        entity.original_label = label.clone();
        entity.label = label;
        entity.subtitle = clean(&record.subtitle);
        entity.tags = clean_tags(record.tags.iter().map(String::as_str));
        entity.parent_ref = clean_optional(record.parent_native_id.as_deref())
            .map(|parent| IdentityKey::new(SourceKind::Tour, parent));
        entity.navigation_ref = record.navigation_handle;
        entity.playlist_order = record.playlist_index;
        entity.media_id = clean_optional(record.media_id.as_deref());
        entity.image_ref = clean_optional(record.thumbnail.as_deref());

        Ok(entity)
    }

    /// Normalize one business-feed record.
    ///
    /// `order_base` is the first synthetic playlist position available to
    /// secondary records, so they sort after all native content.
    pub fn normalize_business(
        &self,
        record: &BusinessRecord,
        ordinal: usize,
        order_base: u32,
    ) -> Result<CatalogEntity, NormalizeError> {
        let image_ref = clean_optional(record.local_image_path.as_deref())
            .or_else(|| clean_optional(record.image_url.as_deref()));

        self.normalize_secondary(
            SourceKind::Business,
            SecondaryFields {
                id: &record.id,
                name: &record.name,
                description: &record.description,
                tags: clean_tags(record.match_tags.iter().map(String::as_str)),
                image_ref,
                element_type: record.element_type.as_deref(),
                parent_id: record.parent_id.as_deref(),
            },
            ordinal,
            order_base,
        )
    }

    /// Normalize one spreadsheet row.
    pub fn normalize_sheet(
        &self,
        record: &SheetRecord,
        ordinal: usize,
        order_base: u32,
    ) -> Result<CatalogEntity, NormalizeError> {
        self.normalize_secondary(
            SourceKind::Sheet,
            SecondaryFields {
                id: &record.id,
                name: &record.name,
                description: &record.description,
                tags: clean_tags([record.tag.as_str()]),
                image_ref: clean_optional(record.image_url.as_deref()),
                element_type: record.element_type.as_deref(),
                parent_id: record.parent_id.as_deref(),
            },
            ordinal,
            order_base,
        )
    }

    fn normalize_secondary(
        &self,
        source: SourceKind,
        fields: SecondaryFields<'_>,
        ordinal: usize,
        order_base: u32,
    ) -> Result<CatalogEntity, NormalizeError> {
        let id = non_empty(fields.id);
        let name = clean(fields.name);

        if id.is_none() && fields.tags.is_empty() && name.is_empty() {
            return Err(NormalizeError::MissingIdentity {
                source_kind: source,
                ordinal,
            });
        }

        let type_hint = fields
            .element_type
            .and_then(|t| t.trim().parse::<EntityType>().ok());

        let key = match &id {
            Some(id) => IdentityKey::new(source, id.clone()),
            None => IdentityKey::ordinal(source, ordinal),
        };

        let mut entity = CatalogEntity::new(key, type_hint.unwrap_or(EntityType::Business), ordinal);
        entity.native_id = id;
        entity.original_label = name.clone();
        entity.label = name;
        entity.subtitle = clean(fields.description);
        entity.description = non_empty(fields.description);
        entity.tags = fields.tags;
        entity.image_ref = fields.image_ref;
        entity.type_hint = type_hint;
        entity.parent_ref = clean_optional(fields.parent_id)
            .map(|parent| IdentityKey::new(SourceKind::Tour, parent));
        entity.playlist_order = Some(secondary_order(order_base, ordinal.saturating_sub(1)));

        Ok(entity)
    }

    /// Normalize the whole tour, dropping malformed and duplicate records.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub fn normalize_tour_batch(&self, records: Vec<TourRecord>) -> Vec<CatalogEntity> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut entities = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let ordinal = index + 1;
            let result = self.normalize_tour(record, ordinal).and_then(|entity| {
                if seen.insert(entity.identity_key.id.clone()) {
                    Ok(entity)
                } else {
                    Err(NormalizeError::DuplicateIdentity {
                        source_kind: SourceKind::Tour,
                        ordinal,
                        id: entity.identity_key.id,
                    })
                }
            });

            match result {
                Ok(entity) => entities.push(entity),
                Err(e) => warn!(error = %e, "Skipping malformed tour record"),
            }
        }

        debug!(normalized = entities.len(), "Normalized tour records");
        entities
    }

    /// Normalize the business feed, dropping malformed records.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub fn normalize_business_batch(
        &self,
        records: &[BusinessRecord],
        order_base: u32,
    ) -> Vec<CatalogEntity> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                self.normalize_business(record, index + 1, order_base)
                    .map_err(|e| warn!(error = %e, "Skipping malformed business record"))
                    .ok()
            })
            .collect()
    }

    /// Normalize the spreadsheet feed, dropping malformed rows.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub fn normalize_sheet_batch(&self, records: &[SheetRecord], order_base: u32) -> Vec<CatalogEntity> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                self.normalize_sheet(record, index + 1, order_base)
                    .map_err(|e| warn!(error = %e, "Skipping malformed sheet row"))
                    .ok()
            })
            .collect()
    }
}
