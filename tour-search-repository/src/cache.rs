//! Time-boxed local cache for the spreadsheet feed.
//!
//! The cache is a single JSON file holding the decoded rows and the moment
//! they were written. Entries older than the configured TTL are stale and
//! are ignored, which forces a re-fetch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::SourceError;
use tour_search_shared::SheetRecord;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    written_at: DateTime<Utc>,
    rows: Vec<SheetRecord>,
}

/// File-backed cache of spreadsheet rows.
#[derive(Debug, Clone)]
pub struct SheetCache {
    path: PathBuf,
    ttl: Duration,
}

impl SheetCache {
    /// Create a cache stored at `path` whose entries live for `ttl`.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load cached rows if a fresh entry exists.
    pub async fn load(&self) -> Result<Option<Vec<SheetRecord>>, SourceError> {
        self.load_at(Utc::now()).await
    }

    /// Load cached rows as seen at `now`.
    ///
    /// Returns `Ok(None)` when there is no entry or the entry is stale.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load_at(&self, now: DateTime<Utc>) -> Result<Option<Vec<SheetRecord>>, SourceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::cache(format!("corrupt cache entry: {}", e)))?;

        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| SourceError::cache(format!("invalid TTL: {}", e)))?;
        let age = now.signed_duration_since(entry.written_at);

        if age > ttl {
            debug!(age_secs = age.num_seconds(), "Sheet cache entry is stale");
            return Ok(None);
        }

        debug!(rows = entry.rows.len(), "Sheet cache hit");
        Ok(Some(entry.rows))
    }

    /// Replace the cached rows, stamping them with the current time.
    pub async fn store(&self, rows: &[SheetRecord]) -> Result<(), SourceError> {
        self.store_at(rows, Utc::now()).await
    }

    /// Replace the cached rows, stamping them with `written_at`.
    pub async fn store_at(&self, rows: &[SheetRecord], written_at: DateTime<Utc>) -> Result<(), SourceError> {
        let entry = CacheEntry {
            written_at,
            rows: rows.to_vec(),
        };
        let bytes = serde_json::to_vec(&entry)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, bytes).await?;

        debug!(rows = rows.len(), path = %self.path.display(), "Stored sheet cache entry");
        Ok(())
    }

    /// Remove the cache file. Returns whether an entry existed.
    pub async fn clear(&self) -> Result<bool, SourceError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
