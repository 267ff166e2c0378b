//! Display label fallback chain.

use crate::config::{LabelSettings, DEFAULT_PLACEHOLDER};
use tour_search_shared::CatalogEntity;

/// Suffix identifying an entity when its label has to be synthesized:
/// ` (id)` when the entity has an id, ` n` (its ordinal) otherwise.
fn identity_suffix(entity: &CatalogEntity) -> String {
    match &entity.native_id {
        Some(id) => format!(" ({})", id),
        None => format!(" {}", entity.ordinal),
    }
}

/// Derive a non-empty display label.
///
/// Tries, in order: the entity's own label, its subtitle, its joined tags,
/// the entity type with an identity suffix, and finally the placeholder text
/// with the same suffix. Disabled steps are skipped.
pub fn resolve_label(entity: &CatalogEntity, settings: &LabelSettings) -> String {
    let label = entity.label.trim();
    if !label.is_empty() {
        return label.to_string();
    }

    if settings.use_subtitle {
        let subtitle = entity.subtitle.trim();
        if !subtitle.is_empty() {
            return subtitle.to_string();
        }
    }

    if settings.use_tags {
        let tags: Vec<&str> = entity
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            return tags.join(", ");
        }
    }

    let suffix = identity_suffix(entity);
    if settings.use_entity_type {
        return format!("{}{}", entity.entity_type, suffix);
    }

    let placeholder = match settings.placeholder_text.trim() {
        "" => DEFAULT_PLACEHOLDER,
        text => text,
    };
    format!("{}{}", placeholder, suffix)
}
