//! Feed locations.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;
use url::Url;

use crate::errors::SourceError;

/// Where a feed payload lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    /// Fetched with an HTTP GET.
    Http(Url),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl FeedLocation {
    /// Retrieve the raw payload.
    pub async fn fetch_text(&self, client: &reqwest::Client) -> Result<String, SourceError> {
        match self {
            FeedLocation::Http(url) => {
                debug!(url = %url, "Fetching feed over HTTP");
                let response = client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::http(format!("{} returned {}", url, status)));
                }
                Ok(response.text().await?)
            }
            FeedLocation::File(path) => {
                debug!(path = %path.display(), "Reading feed from file");
                Ok(tokio::fs::read_to_string(path).await?)
            }
        }
    }
}

impl FromStr for FeedLocation {
    type Err = SourceError;

    /// `http://` and `https://` strings become URLs, anything else a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SourceError::parse("empty feed location"));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| SourceError::parse(format!("invalid feed URL {}: {}", s, e)))?;
            return Ok(FeedLocation::Http(url));
        }
        Ok(FeedLocation::File(PathBuf::from(s)))
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLocation::Http(url) => write!(f, "{}", url),
            FeedLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        assert!(matches!(
            "https://example.com/feed.json".parse::<FeedLocation>(),
            Ok(FeedLocation::Http(_))
        ));
        assert_eq!(
            "data/sheet.csv".parse::<FeedLocation>().unwrap(),
            FeedLocation::File(PathBuf::from("data/sheet.csv"))
        );
        assert!("".parse::<FeedLocation>().is_err());
        assert!("http://".parse::<FeedLocation>().is_err());
    }

    #[tokio::test]
    async fn test_fetch_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        tokio::fs::write(&path, "[]").await.unwrap();

        let location = FeedLocation::File(path);
        let text = location.fetch_text(&reqwest::Client::new()).await.unwrap();
        assert_eq!(text, "[]");
    }
}
