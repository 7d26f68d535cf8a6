//! Overseerr API client
//!
//! Signs in with local credentials once at connect time; the session
//! cookie issued there backs every later call, alongside the X-Api-Key
//! header. The request list is paginated and folded into a
//! [`RequestLedger`] snapshot.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::OverseerrConfig;
use crate::models::RequestLedger;

const USER_AGENT: &str = "sweeparr/0.1.0";
const PAGE_SIZE: usize = 250;
/// Upper bound on pages walked; a short page stops the walk earlier
const MAX_PAGES: usize = 9;

/// Overseerr client errors
#[derive(Debug, Error)]
pub enum OverseerrError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication failed ({0}): {1}")]
    AuthFailed(u16, String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct RequestPage {
    #[serde(default)]
    results: Vec<MediaRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaRequest {
    media: RequestMedia,
    requested_by: Option<RequestUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestMedia {
    tmdb_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RequestUser {
    email: Option<String>,
}

/// Overseerr API client holding an authenticated session
#[derive(Debug)]
pub struct OverseerrClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl OverseerrClient {
    /// Build the client and authenticate
    ///
    /// # Errors
    /// Authentication failure is fatal: without a session the request
    /// provenance signal cannot be trusted to be empty rather than missing.
    pub async fn connect(config: &OverseerrConfig) -> Result<Self, OverseerrError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()
            .map_err(|e| OverseerrError::NetworkError(e.to_string()))?;

        let client = Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        };

        client.authenticate(&config.email, &config.password).await?;

        Ok(client)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<(), OverseerrError> {
        let url = format!("{}/api/v1/auth/local", self.base_url);

        tracing::debug!(url = %url, "Authenticating with Overseerr");

        let response = self
            .http_client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| OverseerrError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OverseerrError::AuthFailed(status.as_u16(), error_text));
        }

        tracing::info!("Authenticated with Overseerr");

        Ok(())
    }

    /// Fetch every available request and fold it into a ledger
    ///
    /// Pages newest-first; requests without a TMDB id or requester email
    /// are skipped.
    pub async fn request_ledger(&self) -> Result<RequestLedger, OverseerrError> {
        let url = format!("{}/api/v1/request", self.base_url);
        let mut ledger = RequestLedger::empty();
        let mut fetched = 0usize;

        for page in 0..MAX_PAGES {
            let skip = page * PAGE_SIZE;

            tracing::debug!(page = page + 1, skip, "Fetching Overseerr request page");

            let response = self
                .http_client
                .get(&url)
                .header("X-Api-Key", &self.api_key)
                .query(&[
                    ("take", PAGE_SIZE.to_string()),
                    ("skip", skip.to_string()),
                    ("sort", "added".to_string()),
                    ("filter", "available".to_string()),
                ])
                .send()
                .await
                .map_err(|e| OverseerrError::NetworkError(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(OverseerrError::ApiError(status.as_u16(), error_text));
            }

            let body: RequestPage = response
                .json()
                .await
                .map_err(|e| OverseerrError::ParseError(e.to_string()))?;

            let page_len = body.results.len();
            fetched += page_len;

            for request in body.results {
                let Some(tmdb_id) = request.media.tmdb_id else {
                    continue;
                };
                let Some(email) = request.requested_by.and_then(|u| u.email) else {
                    continue;
                };
                ledger.record(tmdb_id.to_string(), email);
            }

            if page_len < PAGE_SIZE {
                break;
            }
        }

        tracing::info!(
            requests = fetched,
            movies = ledger.len(),
            "Retrieved request history from Overseerr"
        );

        Ok(ledger)
    }
}
