//! Song catalog client used to fill in missing song metadata
//!
//! When a song is created without a genre, collection or cover, the catalog is
//! searched with the song's title and first artist. Only fields the client left
//! empty are filled; a failed lookup never fails song creation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::db::songs::NewSong;

const USER_AGENT: &str = concat!("songrate/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Metadata found for a song
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMatch {
    pub genre: Option<String>,
    pub collection: Option<String>,
    pub cover: Option<String>,
}

/// Song metadata lookup
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Best match for `term`, or `None` when the catalog has no result
    async fn search(&self, term: &str) -> Result<Option<CatalogMatch>, CatalogError>;
}

/// Search term for a song: its title followed by the first artist's name
pub fn search_term(title: &str, first_artist: Option<&str>) -> String {
    match first_artist {
        Some(artist) => format!("{} {}", title, artist),
        None => title.to_string(),
    }
}

/// Fill the song's empty metadata fields from `found`
pub fn apply_match(song: &mut NewSong, found: CatalogMatch) {
    if song.genre.is_none() {
        song.genre = found.genre;
    }
    if song.collection.is_none() {
        song.collection = found.collection;
    }
    if song.cover.is_none() {
        song.cover = found.cover;
    }
}

/// iTunes-style search API response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    primary_genre_name: Option<String>,
    collection_name: Option<String>,
    artwork_url100: Option<String>,
}

impl From<SearchResult> for CatalogMatch {
    fn from(result: SearchResult) -> Self {
        Self {
            genre: result.primary_genre_name,
            collection: result.collection_name,
            cover: result.artwork_url100,
        }
    }
}

/// Client for an iTunes-compatible search endpoint
/// (`GET <url>?term=...&entity=song&limit=1`)
pub struct ItunesCatalog {
    http_client: reqwest::Client,
    search_url: String,
}

impl ItunesCatalog {
    pub fn new(search_url: impl Into<String>) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            search_url: search_url.into(),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl CatalogLookup for ItunesCatalog {
    async fn search(&self, term: &str) -> Result<Option<CatalogMatch>, CatalogError> {
        tracing::debug!(term = %term, url = %self.search_url, "Querying song catalog");

        let response = self
            .http_client
            .get(&self.search_url)
            .query(&[("term", term), ("entity", "song"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(body.results.into_iter().next().map(CatalogMatch::from))
    }
}
