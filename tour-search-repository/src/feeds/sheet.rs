//! Spreadsheet feeds.

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::errors::SourceError;
use crate::feeds::location::FeedLocation;
use crate::interfaces::RecordFeed;
use crate::sheet::{parse_sheet, SheetFormat};
use tour_search_shared::SheetRecord;

/// A spreadsheet export served as CSV or JSON.
pub struct SheetFeed {
    location: FeedLocation,
    format: Option<SheetFormat>,
    client: reqwest::Client,
}

impl SheetFeed {
    /// Create a feed; `format` of `None` detects the format per payload.
    pub fn new(location: FeedLocation, format: Option<SheetFormat>, client: reqwest::Client) -> Self {
        Self {
            location,
            format,
            client,
        }
    }
}

#[async_trait]
impl RecordFeed<SheetRecord> for SheetFeed {
    fn name(&self) -> &str {
        "sheet"
    }

    #[instrument(skip(self), fields(location = %self.location))]
    async fn fetch(&self) -> Result<Vec<SheetRecord>, SourceError> {
        let text = self.location.fetch_text(&self.client).await?;
        let rows = parse_sheet(&text, self.format)?;
        info!(count = rows.len(), "Fetched sheet feed");
        Ok(rows)
    }
}
