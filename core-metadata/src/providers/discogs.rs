//! Discogs API Client
//!
//! Database search against the Discogs API, used as the secondary
//! (fallback) source of the verification chain. Authenticates with a
//! personal access token; a 401/403 from Discogs is a credential problem
//! and is never retried.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bridge_traits::time::{Clock, SystemClock};
use core_runtime::retry::retry_with_policy;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{MetadataError, Result};
use crate::rate_limit::{RateLimiter, DEFAULT_REQUEST_INTERVAL};

/// Discogs API base URL
const DISCOGS_API_BASE: &str = "https://api.discogs.com";

/// Maximum number of results to retrieve per search
const MAX_SEARCH_RESULTS: u32 = 10;

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn default_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(10),
        use_exponential_backoff: true,
    }
}

/// One entry from a Discogs database search.
///
/// Discogs titles are "Artist - Title" strings; version qualifiers (live,
/// remix, ...) appear inline, which is what the keyword scan relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DiscogsRecord>,
}

/// Discogs database search client.
pub struct DiscogsClient {
    http_client: Arc<dyn HttpClient>,
    token: String,
    user_agent: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    retry_policy: RetryPolicy,
    cancel: CancellationToken,
}

impl DiscogsClient {
    pub fn new(http_client: Arc<dyn HttpClient>, token: String, user_agent: String) -> Self {
        Self::with_clock(http_client, token, user_agent, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http_client: Arc<dyn HttpClient>,
        token: String,
        user_agent: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            token,
            user_agent,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                DEFAULT_REQUEST_INTERVAL,
                clock,
            ))),
            retry_policy: default_retry_policy(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Search the Discogs database for a track.
    ///
    /// An empty result set means Discogs has nothing matching; it is not
    /// an error.
    pub async fn search(&self, artist: &str, title: &str) -> Result<Vec<DiscogsRecord>> {
        let query = format!("{} - {}", artist, title);
        let url = format!(
            "{}/database/search?q={}&type=master&per_page={}",
            DISCOGS_API_BASE,
            urlencoding::encode(&query),
            MAX_SEARCH_RESULTS
        );

        debug!("Searching Discogs: {}", url);

        retry_with_policy(
            &self.retry_policy,
            &self.cancel,
            MetadataError::is_retryable,
            || self.search_once(&url),
        )
        .await
    }

    async fn search_once(&self, url: &str) -> Result<Vec<DiscogsRecord>> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Authorization", format!("Discogs token={}", self.token))
            .header("User-Agent", &self.user_agent)
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::Network(format!("Discogs search failed: {}", e)))?;

        match response.status {
            status if (200..300).contains(&status) => {
                let parsed: SearchResponse = response
                    .json()
                    .map_err(|e| MetadataError::JsonParse(e.to_string()))?;
                Ok(parsed.results)
            }
            404 => Ok(Vec::new()),
            401 | 403 => Err(MetadataError::Unauthorized {
                provider: "discogs".to_string(),
                status: response.status,
            }),
            429 => {
                let retry_after = response.retry_after().map(|d| d.as_secs()).unwrap_or(60);
                Err(MetadataError::RateLimited {
                    provider: "discogs".to_string(),
                    retry_after_seconds: retry_after,
                })
            }
            status => Err(MetadataError::HttpStatus {
                status,
                body: response.text().unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "results": [
                {"id": 12345, "title": "Artist - Song (Live)", "type": "master"},
                {"id": 67890, "title": "Artist - Song", "type": "release"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].kind, "master");
        assert!(parsed.results[0].title.contains("Live"));
    }

    #[test]
    fn test_empty_response_parsing() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
