//! Entity type detection for native tour records.
//!
//! Detection runs three policies in order and stops at the first answer:
//! the structural class name reported by the host, the shape of the
//! record's properties, and finally patterns in the label.

use std::collections::BTreeMap;

use serde_json::Value;

use tour_search_shared::EntityType;

/// Resolve the entity type of a tour record, defaulting to `Element`.
pub fn detect_type(
    class_hint: Option<&str>,
    properties: &BTreeMap<String, Value>,
    label: &str,
) -> EntityType {
    class_hint
        .and_then(type_from_class_hint)
        .or_else(|| type_from_properties(properties))
        .or_else(|| type_from_label(label))
        .unwrap_or(EntityType::Element)
}

/// Structural class names, most specific first.
pub fn type_from_class_hint(hint: &str) -> Option<EntityType> {
    let hint = hint.to_lowercase();
    let has = |needle: &str| hint.contains(needle);

    let ty = if has("projectedimage") {
        EntityType::ProjectedImage
    } else if has("model3dobject") || has("3dobject") || has("3dhotspot") {
        EntityType::Model3DObject
    } else if has("model3d") || has("3dmodel") {
        EntityType::Model3D
    } else if has("hotspot") {
        EntityType::Hotspot
    } else if has("polygon") {
        EntityType::Polygon
    } else if has("video") {
        EntityType::Video
    } else if has("webframe") || has("iframe") {
        EntityType::Webframe
    } else if has("image") || has("photo") {
        EntityType::Image
    } else if has("text") || has("label") {
        EntityType::Text
    } else if has("panorama") && has("overlay") {
        EntityType::Hotspot
    } else if has("panorama") {
        EntityType::Panorama
    } else if has("business") {
        EntityType::Business
    } else {
        return None;
    };
    Some(ty)
}

/// Property-shape heuristics, checked in a fixed order.
pub fn type_from_properties(properties: &BTreeMap<String, Value>) -> Option<EntityType> {
    const SHAPES: [(&[&str], EntityType); 7] = [
        (&["vertices", "points"], EntityType::Polygon),
        (&["video", "videourl"], EntityType::Video),
        (&["url", "iframe", "iframeurl"], EntityType::Webframe),
        (&["objectid"], EntityType::Model3DObject),
        (&["model", "modelurl"], EntityType::Model3D),
        (&["image", "imageurl"], EntityType::Image),
        (&["html", "text"], EntityType::Text),
    ];

    let present = |name: &str| {
        properties
            .iter()
            .any(|(key, value)| !value.is_null() && key.to_lowercase() == name)
    };

    SHAPES
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| present(k)))
        .map(|(_, ty)| *ty)
}

/// Label substring patterns.
pub fn type_from_label(label: &str) -> Option<EntityType> {
    const PATTERNS: [(&str, EntityType); 10] = [
        ("hotspot", EntityType::Hotspot),
        ("polygon", EntityType::Polygon),
        ("video", EntityType::Video),
        ("webframe", EntityType::Webframe),
        ("iframe", EntityType::Webframe),
        ("projected", EntityType::ProjectedImage),
        ("3d model", EntityType::Model3D),
        ("image", EntityType::Image),
        ("text", EntityType::Text),
        ("panorama", EntityType::Panorama),
    ];

    let label = label.to_lowercase();
    PATTERNS
        .iter()
        .find(|(pattern, _)| label.contains(pattern))
        .map(|(_, ty)| *ty)
}
