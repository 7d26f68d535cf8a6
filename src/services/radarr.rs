//! Radarr API client
//!
//! Lists the movies an instance manages and deletes them on request.
//! Listing runs once per instance during setup, so a failure there is
//! fatal; deletions go through the [`MovieRemover`] seam and are isolated
//! per copy by the executor.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::RadarrInstanceConfig;
use crate::models::ExternalRatings;
use crate::types::{MovieRemover, RemoveError};

const USER_AGENT: &str = "sweeparr/0.1.0";

/// Radarr client errors
#[derive(Debug, Error)]
pub enum RadarrError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One movie as Radarr reports it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovie {
    /// Id on this instance, used for deletion
    pub id: i64,
    pub title: String,
    pub tmdb_id: i64,
    /// Whether a file for this movie exists on disk
    pub has_file: bool,
    #[serde(default)]
    pub ratings: RadarrRatings,
}

/// Per-source rating blocks; any source may be missing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrRatings {
    pub imdb: Option<RadarrRatingValue>,
    pub rotten_tomatoes: Option<RadarrRatingValue>,
    pub tmdb: Option<RadarrRatingValue>,
    pub metacritic: Option<RadarrRatingValue>,
    pub trakt: Option<RadarrRatingValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadarrRatingValue {
    #[serde(default)]
    pub value: Option<f64>,
}

impl RadarrMovie {
    /// Ratings normalized to the 0-10 scale
    ///
    /// Radarr reports Rotten Tomatoes and Metacritic as 0-100 percentages;
    /// the other sources are already 0-10.
    pub fn external_ratings(&self) -> ExternalRatings {
        let value = |r: &Option<RadarrRatingValue>| r.as_ref().and_then(|v| v.value);

        ExternalRatings {
            imdb: value(&self.ratings.imdb),
            rotten_tomatoes: value(&self.ratings.rotten_tomatoes).map(|v| v / 10.0),
            tmdb: value(&self.ratings.tmdb),
            metacritic: value(&self.ratings.metacritic).map(|v| v / 10.0),
            trakt: value(&self.ratings.trakt),
        }
    }
}

/// Client for one Radarr instance
pub struct RadarrClient {
    name: String,
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl RadarrClient {
    pub fn new(config: &RadarrInstanceConfig) -> Result<Self, RadarrError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RadarrError::NetworkError(e.to_string()))?;

        Ok(Self {
            name: config.name.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    /// All movies known to this instance
    pub async fn list_movies(&self) -> Result<Vec<RadarrMovie>, RadarrError> {
        let url = format!("{}/api/v3/movie", self.base_url);

        tracing::debug!(instance = %self.name, url = %url, "Listing Radarr movies");

        let response = self
            .http_client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| RadarrError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RadarrError::ApiError(status.as_u16(), error_text));
        }

        let movies: Vec<RadarrMovie> = response
            .json()
            .await
            .map_err(|e| RadarrError::ParseError(e.to_string()))?;

        tracing::info!(
            instance = %self.name,
            count = movies.len(),
            "Retrieved movie list from Radarr"
        );

        Ok(movies)
    }
}

#[async_trait::async_trait]
impl MovieRemover for RadarrClient {
    fn instance_name(&self) -> &str {
        &self.name
    }

    /// Delete a movie and its files from this instance
    async fn delete_movie(&self, movie_id: i64) -> Result<(), RemoveError> {
        let url = format!("{}/api/v3/movie/{}", self.base_url, movie_id);

        tracing::debug!(instance = %self.name, movie_id, "Deleting movie from Radarr");

        let response = self
            .http_client
            .delete(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("deleteFiles", "true"),
            ])
            .send()
            .await
            .map_err(|e| RemoveError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RemoveError::Api(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> RadarrClient {
        RadarrClient::new(&RadarrInstanceConfig {
            name: "test".to_string(),
            url: server.uri(),
            api_key: "radarr-key".to_string(),
        })
        .expect("client should build")
    }

    #[tokio::test]
    async fn test_list_movies_parses_and_scales_ratings() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/movie"))
            .and(query_param("apikey", "radarr-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 11,
                    "title": "The Matrix",
                    "tmdbId": 603,
                    "hasFile": true,
                    "ratings": {
                        "imdb": {"value": 7.0, "votes": 100},
                        "rottenTomatoes": {"value": 80.0, "votes": 50},
                        "tmdb": {"value": 6.5, "votes": 70}
                    }
                },
                {
                    "id": 12,
                    "title": "Unmatched",
                    "tmdbId": 604,
                    "hasFile": false
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let movies = client.list_movies().await.expect("listing should succeed");

        assert_eq!(movies.len(), 2);
        assert!(movies[0].has_file);
        assert!(!movies[1].has_file);

        let ratings = movies[0].external_ratings();
        assert_eq!(ratings.imdb, Some(7.0));
        assert_eq!(ratings.rotten_tomatoes, Some(8.0));
        assert_eq!(ratings.tmdb, Some(6.5));
        assert_eq!(ratings.metacritic, None);
        assert_eq!(ratings.average(), Some(7.2));
    }

    #[tokio::test]
    async fn test_list_movies_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/movie"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.list_movies().await.unwrap_err();

        assert!(matches!(err, RadarrError::ApiError(401, _)));
    }

    #[tokio::test]
    async fn test_delete_movie_requests_file_removal() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v3/movie/11"))
            .and(query_param("apikey", "radarr-key"))
            .and(query_param("deleteFiles", "true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.delete_movie(11).await.expect("delete should succeed");
    }

    #[tokio::test]
    async fn test_delete_movie_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v3/movie/11"))
            .respond_with(ResponseTemplate::new(404).set_body_string("NotFound"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.delete_movie(11).await.unwrap_err();

        assert!(matches!(err, RemoveError::Api(404, _)));
    }
}
