//! Dependency initialization and wiring for the tour search catalog.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::TourSearchError;
use tour_search_pipeline::{CatalogBuilder, CatalogConfig, CatalogService, SearchEngine};
use tour_search_repository::feeds::{CachedSheetFeed, JsonFeed, JsonTourFile, SheetFeed};
use tour_search_repository::{RecordFeed, SheetCache, SourceError, WeightedFuzzyIndex};
use tour_search_shared::{BusinessRecord, SheetRecord};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The catalog service ready to build and answer queries.
    pub service: CatalogService,
    /// The spreadsheet cache, when caching is enabled.
    pub sheet_cache: Option<SheetCache>,
    pub config: Arc<CatalogConfig>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(TourSearchError)` - If a setting or the configuration file is invalid
    pub async fn new() -> Result<Self, TourSearchError> {
        Self::from_settings(Settings::from_env()?).await
    }

    /// Initialize all dependencies from explicit settings.
    pub async fn from_settings(settings: Settings) -> Result<Self, TourSearchError> {
        info!(
            tour_file = %settings.tour_file.display(),
            business_feed = ?settings.business_feed.as_ref().map(ToString::to_string),
            sheet_feed = ?settings.sheet_feed.as_ref().map(ToString::to_string),
            "Initializing dependencies"
        );

        let config = match &settings.config_path {
            Some(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    TourSearchError::config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                CatalogConfig::from_json(&text)?
            }
            None => CatalogConfig::default(),
        };
        let config = Arc::new(config);

        let client = reqwest::Client::builder()
            .timeout(settings.feed_timeout)
            .build()
            .map_err(SourceError::from)?;

        let mut builder = CatalogBuilder::new(
            Arc::new(JsonTourFile::new(settings.tour_file.clone())),
            config.clone(),
        )
        .with_fetch_timeout(settings.feed_timeout);

        if let Some(location) = settings.business_feed {
            let feed = JsonFeed::<BusinessRecord>::new("business", location, client.clone());
            builder = builder.with_business_feed(Arc::new(feed));
        }

        let sheet_cache = settings
            .sheet_cache_path
            .as_ref()
            .map(|path| SheetCache::new(path.clone(), settings.sheet_cache_ttl));

        if let Some(location) = settings.sheet_feed {
            let feed = SheetFeed::new(location, settings.sheet_format, client);
            let feed: Arc<dyn RecordFeed<SheetRecord>> = match &sheet_cache {
                Some(cache) => Arc::new(CachedSheetFeed::new(feed, cache.clone())),
                None => Arc::new(feed),
            };
            builder = builder.with_sheet_feed(feed);
        }

        let index = WeightedFuzzyIndex::new(config.fuzzy.clone());
        let engine = SearchEngine::new(Arc::new(index), config.clone());

        info!("Dependencies initialized");

        Ok(Self {
            service: CatalogService::new(builder, engine),
            sheet_cache,
            config,
        })
    }
}
