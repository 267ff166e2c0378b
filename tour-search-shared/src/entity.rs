//! The catalog entity and its identity types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The independent record provider an entity originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Native tour structure.
    Tour,
    /// Curated business-location feed.
    Business,
    /// Spreadsheet-driven feed.
    Sheet,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Tour => "tour",
            SourceKind::Business => "business",
            SourceKind::Sheet => "sheet",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of searchable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Panorama,
    Hotspot,
    Polygon,
    Video,
    Webframe,
    Image,
    Text,
    ProjectedImage,
    Model3D,
    Model3DObject,
    Business,
    Element,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [EntityType; 12] = [
        EntityType::Panorama,
        EntityType::Hotspot,
        EntityType::Polygon,
        EntityType::Video,
        EntityType::Webframe,
        EntityType::Image,
        EntityType::Text,
        EntityType::ProjectedImage,
        EntityType::Model3D,
        EntityType::Model3DObject,
        EntityType::Business,
        EntityType::Element,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Panorama => "Panorama",
            EntityType::Hotspot => "Hotspot",
            EntityType::Polygon => "Polygon",
            EntityType::Video => "Video",
            EntityType::Webframe => "Webframe",
            EntityType::Image => "Image",
            EntityType::Text => "Text",
            EntityType::ProjectedImage => "ProjectedImage",
            EntityType::Model3D => "Model3D",
            EntityType::Model3DObject => "Model3DObject",
            EntityType::Business => "Business",
            EntityType::Element => "Element",
        }
    }

    /// Default heading used for a result group of this type.
    pub fn plural_label(&self) -> &'static str {
        match self {
            EntityType::Panorama => "Panoramas",
            EntityType::Hotspot => "Hotspots",
            EntityType::Polygon => "Polygons",
            EntityType::Video => "Videos",
            EntityType::Webframe => "Web Frames",
            EntityType::Image => "Images",
            EntityType::Text => "Text",
            EntityType::ProjectedImage => "Projected Images",
            EntityType::Model3D => "3D Models",
            EntityType::Model3DObject => "3D Hotspots",
            EntityType::Business => "Businesses",
            EntityType::Element => "Elements",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type name does not denote any [`EntityType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityType(pub String);

impl fmt::Display for UnknownEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type: {}", self.0)
    }
}

impl std::error::Error for UnknownEntityType {}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    /// Parses type names as they appear in feeds: case-insensitive, with
    /// spaces, dashes and underscores ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        let ty = match normalized.as_str() {
            "panorama" | "pano" => EntityType::Panorama,
            "hotspot" => EntityType::Hotspot,
            "polygon" => EntityType::Polygon,
            "video" => EntityType::Video,
            "webframe" | "iframe" => EntityType::Webframe,
            "image" => EntityType::Image,
            "text" => EntityType::Text,
            "projectedimage" => EntityType::ProjectedImage,
            "model3d" | "3dmodel" => EntityType::Model3D,
            "model3dobject" | "3dhotspot" | "3dobject" => EntityType::Model3DObject,
            "business" => EntityType::Business,
            "element" => EntityType::Element,
            _ => return Err(UnknownEntityType(s.to_string())),
        };
        Ok(ty)
    }
}

/// Identity of a catalog entity: the source it came from plus its id within
/// that source. Secondary rows without an id use `#<ordinal>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub source: SourceKind,
    pub id: String,
}

impl IdentityKey {
    pub fn new(source: SourceKind, id: impl Into<String>) -> Self {
        Self {
            source,
            id: id.into(),
        }
    }

    /// Key for a secondary row that carries no id of its own.
    pub fn ordinal(source: SourceKind, ordinal: usize) -> Self {
        Self::new(source, format!("#{}", ordinal))
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Opaque handle the host player uses to focus or trigger an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationHandle(pub String);

impl NavigationHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How certain a cross-source correspondence is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MatchConfidence {
    /// No match attempted or none found.
    #[default]
    None = 0,
    /// Case-insensitive label equality.
    Weak = 1,
    /// Shared tag.
    Medium = 2,
    /// Identity match.
    Exact = 3,
}

impl MatchConfidence {
    pub fn tier(&self) -> u8 {
        *self as u8
    }
}

/// The normalized, search-ready representation of one tour location or element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntity {
    pub identity_key: IdentityKey,
    /// Id as received from the source; absent for id-less secondary rows.
    pub native_id: Option<String>,
    /// 1-based position within the source.
    pub ordinal: usize,
    pub source_kind: SourceKind,
    pub entity_type: EntityType,
    pub label: String,
    pub original_label: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parent_ref: Option<IdentityKey>,
    pub navigation_ref: Option<NavigationHandle>,
    pub match_confidence: MatchConfidence,
    /// Secondary sources whose records were merged into this entity.
    pub matched_sources: Vec<SourceKind>,
    pub boost_weight: f64,
    pub is_standalone: bool,
    pub playlist_order: Option<u32>,
    pub image_ref: Option<String>,
    /// Type declared by a secondary record, used to break ambiguous matches.
    pub type_hint: Option<EntityType>,
    pub media_id: Option<String>,
}

impl CatalogEntity {
    /// Create a bare entity with empty text fields and neutral ranking values.
    pub fn new(identity_key: IdentityKey, entity_type: EntityType, ordinal: usize) -> Self {
        let source_kind = identity_key.source;
        Self {
            identity_key,
            native_id: None,
            ordinal,
            source_kind,
            entity_type,
            label: String::new(),
            original_label: String::new(),
            subtitle: String::new(),
            description: None,
            tags: Vec::new(),
            parent_ref: None,
            navigation_ref: None,
            match_confidence: MatchConfidence::None,
            matched_sources: Vec::new(),
            boost_weight: 1.0,
            is_standalone: false,
            playlist_order: None,
            image_ref: None,
            type_hint: None,
            media_id: None,
        }
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }

    /// Whether a business record contributed to this entity.
    pub fn is_business_backed(&self) -> bool {
        self.source_kind == SourceKind::Business
            || self.matched_sources.contains(&SourceKind::Business)
    }
}
