//! Tour source adapter trait definition.

use crate::errors::SourceError;
use tour_search_shared::TourRecord;

/// Fixed contract for reading the native tour structure from the host player.
///
/// Implementations flatten whatever the host exposes (playlists, overlays,
/// media) into [`TourRecord`]s in native order. The record order defines the
/// default `playlist_order` of records that do not carry an explicit index.
pub trait TourSourceAdapter: Send + Sync {
    /// Human-readable name used in log output.
    fn name(&self) -> &str {
        "tour"
    }

    /// Read every element of the tour.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<TourRecord>)` - The tour elements in native order
    /// * `Err(SourceError)` - If the host structure cannot be read
    fn tour_records(&self) -> Result<Vec<TourRecord>, SourceError>;
}
