//! Tautulli API client
//!
//! Answers one question through the [`WatchHistory`] seam: when was this
//! library item last watched, by anyone. Tautulli wraps every answer in a
//! response envelope with its own result field.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::TautulliConfig;
use crate::types::{HistoryError, WatchHistory};

const USER_AGENT: &str = "sweeparr/0.1.0";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    response: HistoryEnvelope,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    result: String,
    data: Option<HistoryData>,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(default)]
    data: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    /// Epoch seconds of the watch
    date: i64,
}

/// Tautulli API client
pub struct TautulliClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl TautulliClient {
    pub fn new(config: &TautulliConfig) -> Result<Self, HistoryError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HistoryError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }
}

#[async_trait::async_trait]
impl WatchHistory for TautulliClient {
    async fn last_watched(
        &self,
        library_key: &str,
    ) -> Result<Option<DateTime<Utc>>, HistoryError> {
        let url = format!("{}/api/v2", self.base_url);

        tracing::debug!(rating_key = %library_key, "Querying Tautulli watch history");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("cmd", "get_history"),
                ("rating_key", library_key),
                ("length", "1"),
            ])
            .send()
            .await
            .map_err(|e| HistoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HistoryError::Api(status.as_u16(), error_text));
        }

        let history: HistoryResponse = response
            .json()
            .await
            .map_err(|e| HistoryError::Parse(e.to_string()))?;

        if history.response.result != "success" {
            return Err(HistoryError::Api(
                status.as_u16(),
                format!("Tautulli result: {}", history.response.result),
            ));
        }

        let last = history
            .response
            .data
            .map(|d| d.data)
            .unwrap_or_default()
            .into_iter()
            .next();

        match last {
            Some(entry) => {
                let watched = DateTime::from_timestamp(entry.date, 0).ok_or_else(|| {
                    HistoryError::Parse(format!("Invalid watch timestamp {}", entry.date))
                })?;
                Ok(Some(watched))
            }
            None => Ok(None),
        }
    }
}
