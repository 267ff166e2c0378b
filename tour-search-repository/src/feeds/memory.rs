//! In-memory sources.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::interfaces::{RecordFeed, TourSourceAdapter};
use tour_search_shared::TourRecord;

/// A tour whose structure is already materialized.
#[derive(Debug, Clone, Default)]
pub struct StaticTourSource {
    records: Vec<TourRecord>,
}

impl StaticTourSource {
    pub fn new(records: Vec<TourRecord>) -> Self {
        Self { records }
    }
}

impl TourSourceAdapter for StaticTourSource {
    fn tour_records(&self) -> Result<Vec<TourRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

/// A secondary feed answering with a fixed record set.
#[derive(Debug, Clone)]
pub struct StaticFeed<R> {
    name: String,
    records: Vec<R>,
}

impl<R> StaticFeed<R> {
    pub fn new(name: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

#[async_trait]
impl<R> RecordFeed<R> for StaticFeed<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<R>, SourceError> {
        Ok(self.records.clone())
    }
}
