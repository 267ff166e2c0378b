//! Build statistics.

use serde::Serialize;
use tracing::info;

use tour_search_shared::SourceKind;

/// Statistics of one catalog build, logged after every build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub tour_records: usize,
    pub business_records: usize,
    pub sheet_records: usize,
    /// Records skipped by the normalizer.
    pub malformed: usize,
    /// Secondary records merged into a catalog entity.
    pub matched_business: usize,
    pub matched_sheet: usize,
    pub standalone: usize,
    /// Tie-breaks needed beyond the confidence tier.
    pub ambiguous: usize,
    /// Secondary records left out of the catalog, including those attached
    /// to a filtered entity.
    pub dropped: usize,
    /// Entities rejected by the entity filters.
    pub filtered: usize,
    /// Entities in the frozen catalog.
    pub entities: usize,
    /// Sources that failed or timed out and contributed nothing.
    pub unavailable_sources: Vec<SourceKind>,
}

impl BuildReport {
    pub fn is_degraded(&self) -> bool {
        !self.unavailable_sources.is_empty()
    }

    pub(crate) fn log(&self) {
        info!(
            entities = self.entities,
            tour_records = self.tour_records,
            business_records = self.business_records,
            sheet_records = self.sheet_records,
            matched_business = self.matched_business,
            matched_sheet = self.matched_sheet,
            standalone = self.standalone,
            ambiguous = self.ambiguous,
            dropped = self.dropped,
            filtered = self.filtered,
            malformed = self.malformed,
            unavailable = ?self.unavailable_sources,
            "Catalog built"
        );
    }
}
