//! JSON-array feeds.

use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::errors::SourceError;
use crate::feeds::location::FeedLocation;
use crate::interfaces::{RecordFeed, TourSourceAdapter};
use tour_search_shared::TourRecord;

/// A feed whose payload is a JSON array of `R`, such as the business feed.
pub struct JsonFeed<R> {
    name: String,
    location: FeedLocation,
    client: reqwest::Client,
    _records: PhantomData<fn() -> R>,
}

impl<R> JsonFeed<R> {
    pub fn new(name: impl Into<String>, location: FeedLocation, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            location,
            client,
            _records: PhantomData,
        }
    }
}

#[async_trait]
impl<R> RecordFeed<R> for JsonFeed<R>
where
    R: DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(feed = %self.name, location = %self.location))]
    async fn fetch(&self) -> Result<Vec<R>, SourceError> {
        let text = self.location.fetch_text(&self.client).await?;
        let records: Vec<R> = serde_json::from_str(&text)?;
        info!(count = records.len(), "Fetched JSON feed");
        Ok(records)
    }
}

/// Tour structure exported to a JSON file (an array of [`TourRecord`]).
#[derive(Debug, Clone)]
pub struct JsonTourFile {
    path: PathBuf,
}

impl JsonTourFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TourSourceAdapter for JsonTourFile {
    fn tour_records(&self) -> Result<Vec<TourRecord>, SourceError> {
        let text = std::fs::read_to_string(&self.path)?;
        let records: Vec<TourRecord> = serde_json::from_str(&text)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tour_search_shared::BusinessRecord;

    #[tokio::test]
    async fn test_json_feed_reads_business_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("business.json");
        tokio::fs::write(&path, r#"[{"id": "Room-1", "name": "Main Room 1"}]"#)
            .await
            .unwrap();

        let feed: JsonFeed<BusinessRecord> =
            JsonFeed::new("business", FeedLocation::File(path), reqwest::Client::new());
        let records = feed.fetch().await.unwrap();

        assert_eq!(records, vec![BusinessRecord::new("Room-1", "Main Room 1")]);
    }

    #[tokio::test]
    async fn test_json_feed_reports_malformed_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("business.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let feed: JsonFeed<BusinessRecord> =
            JsonFeed::new("business", FeedLocation::File(path), reqwest::Client::new());
        assert!(matches!(feed.fetch().await, Err(SourceError::ParseError(_))));
    }

    #[test]
    fn test_json_tour_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tour.json");
        std::fs::write(
            &path,
            r#"[{"nativeId": "pano-1", "label": "Lobby", "playlistIndex": 0}]"#,
        )
        .unwrap();

        let records = JsonTourFile::new(&path).tour_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "Lobby");
    }
}
