//! Interface definitions for the catalog's external collaborators.
//!
//! The core never touches the host player or the network directly: the tour
//! structure, the secondary feeds and the fuzzy-match index are all reached
//! through the traits defined here, so they can be swapped or mocked.

mod fuzzy_index;
mod record_feed;
mod tour_source;

pub use fuzzy_index::FuzzyIndex;
pub use record_feed::RecordFeed;
pub use tour_source::TourSourceAdapter;
