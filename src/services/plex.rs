//! Plex API client
//!
//! Resolves the movie library section once at connect time, then serves
//! per-movie lookups by TMDB GUID through the [`LibraryCatalog`] seam.
//! Plex answers in JSON when asked via the Accept header.

use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;

use crate::config::PlexConfig;
use crate::types::{CatalogError, LibraryCatalog, LibraryEntry};

const USER_AGENT: &str = "sweeparr/0.1.0";

/// Plex client errors (setup phase)
#[derive(Debug, Error)]
pub enum PlexError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Library section not found: {0}")]
    SectionNotFound(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: SectionsContainer,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directory: Vec<SectionDirectory>,
}

#[derive(Debug, Deserialize)]
struct SectionDirectory {
    key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: ItemsContainer,
}

#[derive(Debug, Deserialize)]
struct ItemsContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlexItem {
    rating_key: String,
    /// Epoch seconds
    added_at: i64,
    user_rating: Option<f64>,
}

/// Plex API client bound to one library section
#[derive(Debug)]
pub struct PlexClient {
    base_url: String,
    token: String,
    section_key: String,
    http_client: reqwest::Client,
}

impl PlexClient {
    /// Connect and resolve the movie library section
    ///
    /// # Errors
    /// Fails when the server is unreachable or the configured section does
    /// not exist; both are fatal setup conditions.
    pub async fn connect(config: &PlexConfig) -> Result<Self, PlexError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlexError::NetworkError(e.to_string()))?;

        let mut client = Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            section_key: String::new(),
            http_client,
        };

        client.section_key = client.find_section_key(&config.section).await?;

        tracing::info!(
            section = %config.section,
            key = %client.section_key,
            "Connected to Plex movie library"
        );

        Ok(client)
    }

    async fn find_section_key(&self, section_title: &str) -> Result<String, PlexError> {
        let url = format!("{}/library/sections", self.base_url);

        tracing::debug!(url = %url, "Listing Plex library sections");

        let response = self
            .http_client
            .get(&url)
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PlexError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlexError::ApiError(status.as_u16(), error_text));
        }

        let sections: SectionsResponse = response
            .json()
            .await
            .map_err(|e| PlexError::ParseError(e.to_string()))?;

        sections
            .media_container
            .directory
            .into_iter()
            .find(|d| d.title == section_title)
            .map(|d| d.key)
            .ok_or_else(|| PlexError::SectionNotFound(section_title.to_string()))
    }
}

#[async_trait::async_trait]
impl LibraryCatalog for PlexClient {
    async fn movie_entry(&self, tmdb_id: &str) -> Result<LibraryEntry, CatalogError> {
        let url = format!(
            "{}/library/sections/{}/all",
            self.base_url, self.section_key
        );
        let guid = format!("tmdb://{}", tmdb_id);

        tracing::debug!(tmdb_id = %tmdb_id, "Looking up movie in Plex");

        let response = self
            .http_client
            .get(&url)
            .query(&[("guid", guid.as_str())])
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(CatalogError::NotFound(tmdb_id.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let items: ItemsResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        // An empty container means Plex never matched this movie.
        let item = items
            .media_container
            .metadata
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(tmdb_id.to_string()))?;

        let added_at = DateTime::from_timestamp(item.added_at, 0).ok_or_else(|| {
            CatalogError::Parse(format!("Invalid addedAt timestamp {}", item.added_at))
        })?;

        Ok(LibraryEntry {
            library_key: item.rating_key,
            added_at,
            user_rating: item.user_rating,
        })
    }
}
