//! Environment-driven settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::TourSearchError;
use tour_search_repository::feeds::FeedLocation;
use tour_search_repository::SheetFormat;

/// Default path of the exported tour structure.
const DEFAULT_TOUR_FILE: &str = "tour.json";

/// Default location of the spreadsheet cache file.
const DEFAULT_SHEET_CACHE_PATH: &str = ".cache/sheet.json";

/// Default lifetime of a spreadsheet cache entry, in seconds.
const DEFAULT_SHEET_CACHE_TTL_SECS: u64 = 3600;

/// Default time allowed to each feed fetch, in seconds.
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

/// Where the sources live and how they are fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tour_file: PathBuf,
    pub business_feed: Option<FeedLocation>,
    pub sheet_feed: Option<FeedLocation>,
    /// Sheet export format; detected from the payload when absent.
    pub sheet_format: Option<SheetFormat>,
    /// Sheet cache file; an empty `SHEET_CACHE_PATH` disables the cache.
    pub sheet_cache_path: Option<PathBuf>,
    pub sheet_cache_ttl: Duration,
    pub feed_timeout: Duration,
    /// JSON document holding the catalog configuration.
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TOUR_FILE`: Exported tour structure (default: tour.json)
    /// - `BUSINESS_FEED_URL`: Business feed URL or path (optional)
    /// - `SHEET_FEED_URL`: Spreadsheet export URL or path (optional)
    /// - `SHEET_FORMAT`: `csv` or `json` (default: detected)
    /// - `SHEET_CACHE_PATH`: Spreadsheet cache file (default: .cache/sheet.json)
    /// - `SHEET_CACHE_TTL_SECS`: Cache entry lifetime (default: 3600)
    /// - `FEED_TIMEOUT_SECS`: Per-feed fetch timeout (default: 10)
    /// - `TOUR_SEARCH_CONFIG`: Catalog configuration file (optional)
    pub fn from_env() -> Result<Self, TourSearchError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TourSearchError> {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let non_empty = |key: &str| value(key).filter(|v| !v.is_empty());

        let location = |key: &str| -> Result<Option<FeedLocation>, TourSearchError> {
            non_empty(key)
                .map(|v| {
                    v.parse::<FeedLocation>()
                        .map_err(|e| TourSearchError::config(format!("{}: {}", key, e)))
                })
                .transpose()
        };

        let seconds = |key: &str, default: u64| -> Result<Duration, TourSearchError> {
            match non_empty(key) {
                Some(v) => v
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| TourSearchError::config(format!("{}: {}", key, e))),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let sheet_format = non_empty("SHEET_FORMAT")
            .map(|v| {
                v.parse::<SheetFormat>()
                    .map_err(|e| TourSearchError::config(format!("SHEET_FORMAT: {}", e)))
            })
            .transpose()?;

        let sheet_cache_path = match value("SHEET_CACHE_PATH") {
            Some(v) if v.is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
            None => Some(PathBuf::from(DEFAULT_SHEET_CACHE_PATH)),
        };

        Ok(Self {
            tour_file: PathBuf::from(
                non_empty("TOUR_FILE").unwrap_or_else(|| DEFAULT_TOUR_FILE.to_string()),
            ),
            business_feed: location("BUSINESS_FEED_URL")?,
            sheet_feed: location("SHEET_FEED_URL")?,
            sheet_format,
            sheet_cache_path,
            sheet_cache_ttl: seconds("SHEET_CACHE_TTL_SECS", DEFAULT_SHEET_CACHE_TTL_SECS)?,
            feed_timeout: seconds("FEED_TIMEOUT_SECS", DEFAULT_FEED_TIMEOUT_SECS)?,
            config_path: non_empty("TOUR_SEARCH_CONFIG").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, TourSearchError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.tour_file, PathBuf::from("tour.json"));
        assert!(settings.business_feed.is_none());
        assert_eq!(settings.sheet_cache_path, Some(PathBuf::from(".cache/sheet.json")));
        assert_eq!(settings.sheet_cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.feed_timeout, Duration::from_secs(10));
        assert!(settings.config_path.is_none());
    }

    #[test]
    fn test_feed_locations_and_overrides() {
        let settings = settings(&[
            ("BUSINESS_FEED_URL", "https://example.com/business.json"),
            ("SHEET_FEED_URL", "data/sheet.csv"),
            ("SHEET_FORMAT", "CSV"),
            ("SHEET_CACHE_PATH", ""),
            ("FEED_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert!(matches!(settings.business_feed, Some(FeedLocation::Http(_))));
        assert_eq!(settings.sheet_feed, Some(FeedLocation::File(PathBuf::from("data/sheet.csv"))));
        assert_eq!(settings.sheet_format, Some(SheetFormat::Csv));
        assert!(settings.sheet_cache_path.is_none());
        assert_eq!(settings.feed_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            settings(&[("FEED_TIMEOUT_SECS", "soon")]),
            Err(TourSearchError::ConfigError(_))
        ));
        assert!(matches!(
            settings(&[("SHEET_FORMAT", "xlsx")]),
            Err(TourSearchError::ConfigError(_))
        ));
        assert!(matches!(
            settings(&[("BUSINESS_FEED_URL", "https://exa mple.com")]),
            Err(TourSearchError::ConfigError(_))
        ));
    }
}
