//! Core types and trait definitions for sweeparr
//!
//! Defines the provider seams the sweep pipeline consumes:
//! - **LibraryCatalog:** media server lookups (added-at, owner rating, library key)
//! - **WatchHistory:** playback history lookups
//! - **MovieRemover:** deletion endpoint on a movie manager instance
//!
//! Each trait gets its own error enum so callers can tell an expected miss
//! (a movie the media server never matched) from a transient failure.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The media server's view of one movie
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Media server key, used for watch history lookups
    pub library_key: String,
    /// When the movie entered the library
    pub added_at: DateTime<Utc>,
    /// Rating the library owner assigned, if any (0-10)
    pub user_rating: Option<f64>,
}

/// Catalog lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Movie is not in the library; expected for unmatched items
    #[error("Not in library: {0}")]
    NotFound(String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Media server returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Watch history lookup errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// History backend returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Deletion errors
#[derive(Debug, Error)]
pub enum RemoveError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Manager instance returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),
}

/// Read access to the media server's library
#[async_trait::async_trait]
pub trait LibraryCatalog: Send + Sync {
    /// Look up a movie by TMDB id
    ///
    /// # Errors
    /// Returns `CatalogError::NotFound` when the server has no matching
    /// entry; other variants signal transient failures.
    async fn movie_entry(&self, tmdb_id: &str) -> Result<LibraryEntry, CatalogError>;
}

/// Read access to playback history
#[async_trait::async_trait]
pub trait WatchHistory: Send + Sync {
    /// Most recent watch timestamp across all users, None if never watched
    async fn last_watched(
        &self,
        library_key: &str,
    ) -> Result<Option<DateTime<Utc>>, HistoryError>;
}

/// Deletion endpoint on one movie manager instance
#[async_trait::async_trait]
pub trait MovieRemover: Send + Sync {
    /// Instance label for logging
    fn instance_name(&self) -> &str;

    /// Delete a movie and its files from this instance
    async fn delete_movie(&self, movie_id: i64) -> Result<(), RemoveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        let err = CatalogError::NotFound("603".to_string());
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert_eq!(err.to_string(), "Not in library: 603");
    }

    #[test]
    fn test_library_entry_holds_optional_rating() {
        let entry = LibraryEntry {
            library_key: "49915".to_string(),
            added_at: Utc::now(),
            user_rating: None,
        };
        assert!(entry.user_rating.is_none());
    }
}
