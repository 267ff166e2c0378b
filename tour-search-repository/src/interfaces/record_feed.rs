//! Secondary record feed trait definition.

use async_trait::async_trait;

use crate::errors::SourceError;

/// Abstract interface for a secondary record feed (business or spreadsheet).
///
/// Feeds are fetched once per catalog build. A fetch that fails or times out
/// is not retried; the build simply proceeds without that feed's records.
#[async_trait]
pub trait RecordFeed<R: Send>: Send + Sync {
    /// Human-readable name used in log output.
    fn name(&self) -> &str;

    /// Fetch every record of the feed.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<R>)` - The records in feed order
    /// * `Err(SourceError)` - If the feed is unreachable or malformed
    async fn fetch(&self) -> Result<Vec<R>, SourceError>;
}
