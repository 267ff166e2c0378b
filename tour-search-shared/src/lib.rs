//! # Tour Search Shared
//!
//! Shared types for the tour search catalog: the normalized
//! [`CatalogEntity`], the frozen [`Catalog`], the raw inbound record
//! shapes delivered by the source adapters, and the grouped result
//! structures handed to the rendering side.

pub mod catalog;
pub mod entity;
pub mod records;
pub mod results;

pub use catalog::Catalog;
pub use entity::{
    CatalogEntity, EntityType, IdentityKey, MatchConfidence, NavigationHandle, SourceKind,
};
pub use records::{BusinessRecord, SheetRecord, TourRecord};
pub use results::{FuzzyMatch, ResultEntry, ResultGroup};
