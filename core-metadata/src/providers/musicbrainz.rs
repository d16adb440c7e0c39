//! MusicBrainz API Client
//!
//! Recording search against the MusicBrainz Web Service, used as the
//! primary source of the verification chain.
//!
//! ## Rate Limiting
//!
//! MusicBrainz allows roughly one request per second for identified
//! clients; the client spaces requests accordingly and identifies itself
//! with the mandatory User-Agent header ("AppName/Version (contact)").
//!
//! ## Retry
//!
//! Transport errors and non-404 HTTP failures are retried up to three
//! attempts with exponential backoff; the rate-limit gate applies to every
//! attempt individually.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bridge_traits::time::{Clock, SystemClock};
use core_runtime::retry::retry_with_policy;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::rate_limit::{RateLimiter, DEFAULT_REQUEST_INTERVAL};

/// MusicBrainz API base URL
const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";

/// Maximum number of recordings to retrieve per search
const MAX_SEARCH_RESULTS: u32 = 10;

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(10),
        use_exponential_backoff: true,
    }
}

/// A recording entry from a MusicBrainz search.
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub title: String,
    /// Free-text qualifier such as "live, 1994-07-02: Sheffield"
    #[serde(default)]
    pub disambiguation: String,
}

impl Recording {
    /// Combined searchable text for keyword scans.
    pub fn descriptive_text(&self) -> String {
        format!("{} {}", self.title, self.disambiguation)
    }
}

#[derive(Debug, Deserialize)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<Recording>,
}

/// MusicBrainz recording search client.
pub struct MusicBrainzClient {
    http_client: Arc<dyn HttpClient>,
    user_agent: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    retry_policy: RetryPolicy,
    cancel: CancellationToken,
}

impl MusicBrainzClient {
    /// Creates a new client.
    ///
    /// `user_agent` must follow MusicBrainz's identification format, e.g.
    /// `"playlist-sync-core/0.1.0 (ops@example.com)"`.
    pub fn new(http_client: Arc<dyn HttpClient>, user_agent: String) -> Self {
        Self::with_clock(http_client, user_agent, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http_client: Arc<dyn HttpClient>,
        user_agent: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
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

    /// Search for recordings matching artist and title.
    ///
    /// Returns an empty vector when MusicBrainz knows nothing matching;
    /// that is a result, not an error.
    pub async fn search_recordings(&self, artist: &str, title: &str) -> Result<Vec<Recording>> {
        let query = format!(
            "artist:\"{}\" AND recording:\"{}\"",
            Self::escape_query(artist),
            Self::escape_query(title)
        );
        let url = format!(
            "{}/recording/?query={}&fmt=json&limit={}",
            MUSICBRAINZ_API_BASE,
            urlencoding::encode(&query),
            MAX_SEARCH_RESULTS
        );

        debug!("Searching MusicBrainz: {}", url);

        retry_with_policy(
            &self.retry_policy,
            &self.cancel,
            MetadataError::is_retryable,
            || self.search_once(&url),
        )
        .await
    }

    async fn search_once(&self, url: &str) -> Result<Vec<Recording>> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::Network(format!("MusicBrainz search failed: {}", e)))?;

        match response.status {
            status if (200..300).contains(&status) => {
                let parsed: RecordingSearchResponse = response
                    .json()
                    .map_err(|e| MetadataError::JsonParse(e.to_string()))?;
                Ok(parsed.recordings)
            }
            404 => Ok(Vec::new()),
            401 | 403 => Err(MetadataError::Unauthorized {
                provider: "musicbrainz".to_string(),
                status: response.status,
            }),
            503 => {
                warn!("MusicBrainz service unavailable (503)");
                Err(MetadataError::HttpStatus {
                    status: 503,
                    body: "service unavailable".to_string(),
                })
            }
            status => Err(MetadataError::HttpStatus {
                status,
                body: response.text().unwrap_or_default(),
            }),
        }
    }

    /// Escapes special characters in Lucene query syntax.
    fn escape_query(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('+', "\\+")
            .replace('-', "\\-")
            .replace('!', "\\!")
            .replace('(', "\\(")
            .replace(')', "\\)")
            .replace('{', "\\{")
            .replace('}', "\\}")
            .replace('[', "\\[")
            .replace(']', "\\]")
            .replace('^', "\\^")
            .replace('~', "\\~")
            .replace('*', "\\*")
            .replace('?', "\\?")
            .replace(':', "\\:")
            .replace('/', "\\/")
    }
}
