//! Raw inbound record shapes delivered by the source adapters.
//!
//! These mirror what each provider hands over before normalization: they
//! are loosely typed, may carry blank fields, and are never stored in a
//! catalog directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::NavigationHandle;

/// One element of the native tour structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourRecord {
    pub native_id: String,
    pub label: String,
    pub subtitle: String,
    pub tags: Vec<String>,
    /// Structural class name reported by the host, e.g. `PanoramaPlayListItem`.
    pub entity_type_hint: Option<String>,
    pub parent_native_id: Option<String>,
    pub playlist_index: Option<u32>,
    pub navigation_handle: Option<NavigationHandle>,
    pub media_id: Option<String>,
    pub thumbnail: Option<String>,
    /// Remaining host properties, consulted for type detection only.
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl TourRecord {
    pub fn new(native_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            native_id: native_id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.entity_type_hint = Some(hint.into());
        self
    }

    pub fn with_parent(mut self, parent_native_id: impl Into<String>) -> Self {
        self.parent_native_id = Some(parent_native_id.into());
        self
    }

    pub fn with_playlist_index(mut self, index: u32) -> Self {
        self.playlist_index = Some(index);
        self
    }
}

/// One entry of the curated business-location feed (a JSON array).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(alias = "tags")]
    pub match_tags: Vec<String>,
    pub image_url: Option<String>,
    pub local_image_path: Option<String>,
    pub element_type: Option<String>,
    pub parent_id: Option<String>,
}

impl BusinessRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One row of the spreadsheet feed, after header resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetRecord {
    pub id: String,
    pub tag: String,
    pub name: String,
    pub description: String,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
    #[serde(alias = "type")]
    pub element_type: Option<String>,
    pub parent_id: Option<String>,
}

impl SheetRecord {
    pub fn new(id: impl Into<String>, tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}
