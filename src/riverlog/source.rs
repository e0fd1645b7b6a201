//! Game API client for the river race log
//!
//! Endpoint: `{base}/clans/%23{tag}/riverracelog`
//! Auth: `Authorization: Bearer {api_key}`
//!
//! Any non-200 answer is a failure carrying the status and response body.
//! No retries: the user's Update action is the retry.

use super::types::ClanTag;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug)]
pub enum FetchError {
    /// Client construction, connection, or timeout failure
    Network(reqwest::Error),
    /// API answered with something other than 200
    Status { status: u16, body: String },
    /// 200 but the body was not JSON
    Decode(reqwest::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {}", e),
            FetchError::Status { status, body } => {
                write!(f, "Failed to fetch data: {} - {}", status, body)
            }
            FetchError::Decode(e) => write!(f, "Invalid JSON response: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Network(e) | FetchError::Decode(e) => Some(e),
            FetchError::Status { .. } => None,
        }
    }
}

/// Source of raw river race logs
#[async_trait]
pub trait RemoteLogSource: Send + Sync {
    /// Fetch the raw log for `clan` as untyped JSON
    async fn fetch_river_race_log(&self, clan: &ClanTag) -> Result<Value, FetchError>;
}

/// HTTP client for the official game API
pub struct ClashApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ClashApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self, FetchError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.http_timeout,
        )
    }

    /// The `#` of the tag is sent URL-encoded
    pub fn log_url(&self, clan: &ClanTag) -> String {
        format!("{}/clans/%23{}/riverracelog", self.base_url, clan.bare())
    }
}

#[async_trait]
impl RemoteLogSource for ClashApiClient {
    async fn fetch_river_race_log(&self, clan: &ClanTag) -> Result<Value, FetchError> {
        let url = self.log_url(clan);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(FetchError::Decode)
    }
}
