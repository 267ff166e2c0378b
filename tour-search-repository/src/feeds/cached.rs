//! Cache wrapper for the spreadsheet feed.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::cache::SheetCache;
use crate::errors::SourceError;
use crate::interfaces::RecordFeed;
use tour_search_shared::SheetRecord;

/// Serves spreadsheet rows from a [`SheetCache`] while the entry is fresh
/// and falls through to the wrapped feed otherwise.
///
/// Cache read and write failures are logged and never fail the fetch.
pub struct CachedSheetFeed<F> {
    inner: F,
    cache: SheetCache,
}

impl<F> CachedSheetFeed<F> {
    pub fn new(inner: F, cache: SheetCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &SheetCache {
        &self.cache
    }
}

#[async_trait]
impl<F> RecordFeed<SheetRecord> for CachedSheetFeed<F>
where
    F: RecordFeed<SheetRecord>,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    #[instrument(skip(self), fields(feed = %self.inner.name()))]
    async fn fetch(&self) -> Result<Vec<SheetRecord>, SourceError> {
        match self.cache.load().await {
            Ok(Some(rows)) => {
                debug!(count = rows.len(), "Serving sheet rows from cache");
                return Ok(rows);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable sheet cache"),
        }

        let rows = self.inner.fetch().await?;

        if let Err(e) = self.cache.store(&rows).await {
            warn!(error = %e, "Failed to store sheet cache entry");
        }

        Ok(rows)
    }
}
