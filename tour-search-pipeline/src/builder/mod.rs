//! Catalog builder.
//!
//! Collects records from the tour source and the secondary feeds, runs them
//! through the normalizer, matcher, resolver and merger, and freezes the
//! result into an immutable [`Catalog`].

mod report;

pub use report::BuildReport;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::CatalogConfig;
use crate::matcher::CrossSourceMatcher;
use crate::merger::{MatchedRecord, Merger};
use crate::normalizer::EntityNormalizer;
use crate::resolver::{AcceptedMatch, ConsumptionState, LabelRegistry, Resolution, Resolver};
use tour_search_repository::{RecordFeed, SourceError, TourSourceAdapter};
use tour_search_shared::{
    BusinessRecord, Catalog, CatalogEntity, SheetRecord, SourceKind, TourRecord,
};

/// Default time allowed to each feed fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw records of one build, one list per source.
#[derive(Debug, Clone, Default)]
pub struct CatalogInputs {
    pub tour: Vec<TourRecord>,
    pub business: Vec<BusinessRecord>,
    pub sheet: Vec<SheetRecord>,
}

/// A frozen catalog together with the statistics of the build.
#[derive(Debug, Clone)]
pub struct BuiltCatalog {
    pub catalog: Catalog,
    pub report: BuildReport,
}

/// First playlist position free for synthetic (secondary) entries, past
/// every native entity's position.
fn synthetic_order_base(tours: &[CatalogEntity]) -> u32 {
    let count = u32::try_from(tours.len()).unwrap_or(u32::MAX);
    tours
        .iter()
        .filter_map(|t| t.playlist_order)
        .map(|order| order.saturating_add(1))
        .fold(count, u32::max)
}

fn accepted_by_tour(resolution: &Resolution) -> HashMap<usize, AcceptedMatch> {
    resolution
        .accepted
        .iter()
        .map(|m| (m.tour_index, *m))
        .collect()
}

fn matched<'a>(
    accepted: &HashMap<usize, AcceptedMatch>,
    pool: &'a [CatalogEntity],
    tour_index: usize,
) -> Option<MatchedRecord<'a>> {
    accepted
        .get(&tour_index)
        .map(|m| MatchedRecord::new(&pool[m.secondary_index], m.confidence))
}

/// Builder producing catalogs from a tour source and optional feeds.
pub struct CatalogBuilder {
    tour_source: Arc<dyn TourSourceAdapter>,
    business_feed: Option<Arc<dyn RecordFeed<BusinessRecord>>>,
    sheet_feed: Option<Arc<dyn RecordFeed<SheetRecord>>>,
    config: Arc<CatalogConfig>,
    fetch_timeout: Duration,
}

impl CatalogBuilder {
    /// Create a builder reading only the tour structure.
    pub fn new(tour_source: Arc<dyn TourSourceAdapter>, config: Arc<CatalogConfig>) -> Self {
        Self {
            tour_source,
            business_feed: None,
            sheet_feed: None,
            config,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_business_feed(mut self, feed: Arc<dyn RecordFeed<BusinessRecord>>) -> Self {
        self.business_feed = Some(feed);
        self
    }

    pub fn with_sheet_feed(mut self, feed: Arc<dyn RecordFeed<SheetRecord>>) -> Self {
        self.sheet_feed = Some(feed);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Gather all sources and build a catalog.
    ///
    /// Feeds are fetched concurrently, each under the fetch timeout. A
    /// source that fails is logged once and contributes no records; the
    /// build itself never fails.
    #[instrument(skip(self))]
    pub async fn build(&self) -> BuiltCatalog {
        info!("Building catalog");
        let mut unavailable = Vec::new();

        let tour = match self.tour_source.tour_records() {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    source = self.tour_source.name(),
                    error = %e,
                    "Source unavailable, continuing without it"
                );
                unavailable.push(SourceKind::Tour);
                Vec::new()
            }
        };

        let (business, sheet) = tokio::join!(
            self.fetch(self.business_feed.as_deref(), self.config.business.enabled),
            self.fetch(self.sheet_feed.as_deref(), self.config.sheet.enabled),
        );

        let inputs = CatalogInputs {
            tour,
            business: Self::settle(SourceKind::Business, business, &mut unavailable),
            sheet: Self::settle(SourceKind::Sheet, sheet, &mut unavailable),
        };

        let mut built = Self::assemble(inputs, &self.config);
        built.report.unavailable_sources = unavailable;
        built.report.log();
        built
    }

    async fn fetch<R: Send>(
        &self,
        feed: Option<&dyn RecordFeed<R>>,
        enabled: bool,
    ) -> Result<Vec<R>, SourceError> {
        let feed = match feed {
            Some(feed) if enabled => feed,
            _ => return Ok(Vec::new()),
        };

        match tokio::time::timeout(self.fetch_timeout, feed.fetch()).await {
            Ok(result) => {
                if let Ok(records) = &result {
                    debug!(feed = feed.name(), count = records.len(), "Fetched feed");
                }
                result
            }
            Err(_) => Err(SourceError::timeout(feed.name(), self.fetch_timeout.as_secs())),
        }
    }

    fn settle<R>(
        source: SourceKind,
        result: Result<Vec<R>, SourceError>,
        unavailable: &mut Vec<SourceKind>,
    ) -> Vec<R> {
        match result {
            Ok(records) => records,
            Err(e) => {
                warn!(source = %source, error = %e, "Source unavailable, continuing without it");
                unavailable.push(source);
                Vec::new()
            }
        }
    }

    /// Reconcile already gathered records into a frozen catalog.
    ///
    /// Runs the tour pass, then the business and sheet passes sharing one
    /// consumption state, applies the entity filters and emits standalone
    /// entries for unmatched secondary records when enabled.
    #[instrument(skip_all, fields(
        tour = inputs.tour.len(),
        business = inputs.business.len(),
        sheet = inputs.sheet.len()
    ))]
    pub fn assemble(inputs: CatalogInputs, config: &CatalogConfig) -> BuiltCatalog {
        let normalizer = EntityNormalizer::new();
        let matcher = CrossSourceMatcher::new();
        let resolver = Resolver::new(config.tie_break_order.clone());
        let merger = Merger::new(config);

        let business = if config.business.enabled { inputs.business } else { Vec::new() };
        let sheet = if config.sheet.enabled { inputs.sheet } else { Vec::new() };

        let mut report = BuildReport {
            tour_records: inputs.tour.len(),
            business_records: business.len(),
            sheet_records: sheet.len(),
            ..Default::default()
        };

        let tours = normalizer.normalize_tour_batch(inputs.tour);
        let business_base = synthetic_order_base(&tours);
        let business_pool = normalizer.normalize_business_batch(&business, business_base);
        let sheet_base = business_base
            .saturating_add(u32::try_from(business_pool.len()).unwrap_or(u32::MAX));
        let sheet_pool = normalizer.normalize_sheet_batch(&sheet, sheet_base);
        report.malformed = (report.tour_records - tours.len())
            + (business.len() - business_pool.len())
            + (sheet.len() - sheet_pool.len());

        let mut state = ConsumptionState::new();
        let business_resolution = resolver.resolve(
            &tours,
            &business_pool,
            &matcher.match_all(&tours, &business_pool),
            &mut state,
        );
        let sheet_resolution = resolver.resolve(
            &tours,
            &sheet_pool,
            &matcher.match_all(&tours, &sheet_pool),
            &mut state,
        );
        report.ambiguous = business_resolution.ambiguous + sheet_resolution.ambiguous;

        let business_matches = accepted_by_tour(&business_resolution);
        let sheet_matches = accepted_by_tour(&sheet_resolution);

        let mut entities = Vec::with_capacity(tours.len());
        let mut labels = LabelRegistry::default();
        let mut keys = HashSet::new();

        for (index, tour) in tours.iter().enumerate() {
            let business_match = matched(&business_matches, &business_pool, index);
            let sheet_match = matched(&sheet_matches, &sheet_pool, index);
            let attached = usize::from(business_match.is_some()) + usize::from(sheet_match.is_some());
            let merged = merger.merge(tour, business_match, sheet_match);
            if !config.filters.admits(&merged) {
                if attached > 0 {
                    debug!(
                        entity = %merged.identity_key,
                        attached,
                        "Dropping secondary records attached to a filtered entity"
                    );
                }
                report.filtered += 1;
                report.dropped += attached;
                continue;
            }
            if business_match.is_some() {
                report.matched_business += 1;
            }
            if sheet_match.is_some() {
                report.matched_sheet += 1;
            }
            keys.insert(merged.identity_key.clone());
            labels.insert(&merged.label);
            entities.push(merged);
        }

        for (pool, resolution) in [
            (&business_pool, &business_resolution),
            (&sheet_pool, &sheet_resolution),
        ] {
            let outcome = resolver.emit_standalone(
                pool,
                &resolution.unmatched,
                config.include_standalone_entries,
                &merger,
                &config.filters,
                &mut labels,
                &mut keys,
            );
            report.standalone += outcome.entities.len();
            report.dropped += outcome.disabled + outcome.duplicate_labels;
            report.filtered += outcome.filtered;
            entities.extend(outcome.entities);
        }

        let catalog = Catalog::freeze(entities, Utc::now());
        report.entities = catalog.len();
        if catalog.is_empty() {
            warn!("Catalog is empty");
        }

        BuiltCatalog { catalog, report }
    }
}
