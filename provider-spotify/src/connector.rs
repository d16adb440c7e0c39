//! Spotify Web API connector implementation
//!
//! Implements the `CatalogProvider` trait against the Spotify Web API:
//! track search (optionally market-scoped), playlist creation, batched
//! track addition, and full-track-list replacement.
//!
//! # Rate limiting
//!
//! Spotify signals rate limiting with 429 plus a `Retry-After` header; the
//! connector honors the header and retries, alongside exponential backoff
//! for 5xx responses. Credential rejections (401/403) are never retried.
//!
//! # Example
//!
//! ```ignore
//! use provider_spotify::SpotifyConnector;
//! use bridge_traits::catalog::{CatalogProvider, TrackQuery};
//!
//! let connector = SpotifyConnector::new(http_client, access_token);
//! let candidates = connector
//!     .search_tracks(&TrackQuery::new("Target Artist", "Target Song"), 20)
//!     .await?;
//! ```

use async_trait::async_trait;
use bridge_traits::catalog::{CatalogProvider, PlaylistOptions, TrackCandidate, TrackQuery};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SpotifyError};
use crate::types::{ErrorResponse, PlaylistCreateResponse, SearchResponse};

/// Spotify Web API base URL
const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Spotify accepts at most 100 tracks per add/replace call
const TRACK_BATCH_LIMIT: usize = 100;

/// Maximum attempts for rate-limited or transiently failing requests
const MAX_ATTEMPTS: u32 = 5;

/// Fallback wait when a 429 carries no Retry-After header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify Web API connector.
///
/// Constructed per use with an already-valid access token; token lifecycle
/// is the caller's concern.
pub struct SpotifyConnector {
    http_client: Arc<dyn HttpClient>,
    access_token: String,
    /// Region code applied to searches, from the connection record
    market: Option<String>,
}

impl SpotifyConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
            market: None,
        }
    }

    /// Scope searches to a market region code (e.g. "DE").
    pub fn with_market(mut self, market: Option<String>) -> Self {
        self.market = market;
        self
    }

    fn build_search_query(query: &TrackQuery) -> String {
        let mut q = format!("track:{} artist:{}", query.title, query.artist);
        if let Some(album) = &query.album {
            q.push_str(&format!(" album:{}", album));
        }
        q
    }

    /// Execute a request, retrying 429s (honoring `Retry-After`) and 5xx
    /// responses with exponential backoff.
    async fn execute_api(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let response = self
                .http_client
                .execute(request.clone())
                .await
                .map_err(|e| SpotifyError::Network(e.to_string()))?;

            match response.status {
                status if (200..300).contains(&status) => return Ok(response),
                401 | 403 => return Err(SpotifyError::Unauthorized(response.status)),
                429 => {
                    let wait = response.retry_after().unwrap_or(DEFAULT_RETRY_AFTER);
                    if attempt >= MAX_ATTEMPTS {
                        return Err(SpotifyError::RateLimited {
                            retry_after_seconds: wait.as_secs(),
                        });
                    }
                    warn!(
                        attempt = attempt,
                        wait_secs = wait.as_secs(),
                        "Spotify rate limit hit, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                status if status >= 500 => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(SpotifyError::Api {
                            status,
                            message: format!("request failed after {} attempts", attempt),
                        });
                    }
                    let backoff = Duration::from_secs(2u64.pow(attempt.min(3)));
                    warn!(
                        status = status,
                        attempt = attempt,
                        "Spotify server error, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                status => {
                    let message = response
                        .json::<ErrorResponse>()
                        .map(|e| e.error.message)
                        .unwrap_or_else(|_| "unknown error".to_string());
                    return Err(SpotifyError::Api { status, message });
                }
            }
        }
    }

    async fn post_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = format!("{}/playlists/{}/tracks", SPOTIFY_API_BASE, playlist_id);
        let request = HttpRequest::new(HttpMethod::Post, url)
            .bearer_token(&self.access_token)
            .json(&json!({ "uris": uris }))
            .map_err(|e| SpotifyError::Network(e.to_string()))?
            .timeout(REQUEST_TIMEOUT);
        self.execute_api(request).await?;
        Ok(())
    }

    async fn put_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = format!("{}/playlists/{}/tracks", SPOTIFY_API_BASE, playlist_id);
        let request = HttpRequest::new(HttpMethod::Put, url)
            .bearer_token(&self.access_token)
            .json(&json!({ "uris": uris }))
            .map_err(|e| SpotifyError::Network(e.to_string()))?
            .timeout(REQUEST_TIMEOUT);
        self.execute_api(request).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for SpotifyConnector {
    #[instrument(skip(self), fields(artist = %query.artist, title = %query.title))]
    async fn search_tracks(
        &self,
        query: &TrackQuery,
        limit: u32,
    ) -> BridgeResult<Vec<TrackCandidate>> {
        let q = Self::build_search_query(query);
        let mut url = format!(
            "{}/search?q={}&type=track&limit={}",
            SPOTIFY_API_BASE,
            urlencoding::encode(&q),
            limit
        );
        if let Some(market) = &self.market {
            url.push_str(&format!("&market={}", market));
        }

        let request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .timeout(REQUEST_TIMEOUT);

        let response = self.execute_api(request).await?;
        let parsed: SearchResponse = response
            .json()
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        let candidates = parsed
            .tracks
            .items
            .into_iter()
            .map(|track| TrackCandidate {
                id: track.uri,
                title: track.name,
                artists: track.artists.into_iter().map(|a| a.name).collect(),
                album: track.album.name,
                duration_ms: track.duration_ms,
            })
            .collect::<Vec<_>>();

        debug!(count = candidates.len(), "Search returned candidates");
        Ok(candidates)
    }

    #[instrument(skip(self, opts))]
    async fn create_playlist(&self, name: &str, opts: &PlaylistOptions) -> BridgeResult<String> {
        let url = format!("{}/me/playlists", SPOTIFY_API_BASE);
        let request = HttpRequest::new(HttpMethod::Post, url)
            .bearer_token(&self.access_token)
            .json(&json!({
                "name": name,
                "public": opts.public,
                "description": opts.description,
            }))
            .map_err(|e| SpotifyError::Network(e.to_string()))?
            .timeout(REQUEST_TIMEOUT);

        let response = self.execute_api(request).await?;
        let created: PlaylistCreateResponse = response
            .json()
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        info!(playlist_id = %created.id, "Playlist created");
        Ok(created.id)
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> BridgeResult<()> {
        for chunk in track_ids.chunks(TRACK_BATCH_LIMIT) {
            self.post_tracks(playlist_id, chunk).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, track_ids), fields(playlist_id = %playlist_id, count = track_ids.len()))]
    async fn replace_tracks(&self, playlist_id: &str, track_ids: &[String]) -> BridgeResult<()> {
        // The first batch replaces the playlist wholesale; an empty list
        // clears it. Remaining batches append.
        let (first, rest) = track_ids.split_at(track_ids.len().min(TRACK_BATCH_LIMIT));
        self.put_tracks(playlist_id, first).await?;

        for chunk in rest.chunks(TRACK_BATCH_LIMIT) {
            self.post_tracks(playlist_id, chunk).await?;
        }

        info!("Playlist tracks replaced");
        Ok(())
    }

    fn batch_limit(&self) -> usize {
        TRACK_BATCH_LIMIT
    }
}
