//! Feed and source implementations.
//!
//! - [`location`]: HTTP(S) or file locations and raw payload retrieval
//! - [`json`]: JSON-array feeds such as the business feed
//! - [`sheet`]: spreadsheet feeds (CSV or JSON)
//! - [`cached`]: the TTL cache wrapper for the spreadsheet feed
//! - [`memory`]: in-memory sources for embedding and tests

pub mod cached;
pub mod json;
pub mod location;
pub mod memory;
pub mod sheet;

pub use cached::CachedSheetFeed;
pub use json::{JsonFeed, JsonTourFile};
pub use location::FeedLocation;
pub use memory::{StaticFeed, StaticTourSource};
pub use sheet::SheetFeed;
