//! # Token Lifecycle Manager
//!
//! Returns a currently-valid access token for a connection, refreshing it
//! through the provider's token endpoint when it is near expiry.
//!
//! ## Behavior
//!
//! - A token whose expiry is more than five minutes away is returned
//!   unchanged; no network call is made. This is the common, cheap path.
//! - A token within the margin (or with no recorded expiry) is refreshed
//!   with the connection's refresh token. The new access token, the new
//!   expiry, and a rotated refresh token (when the provider sends one) are
//!   persisted as a single atomic update.
//! - A rejected refresh fails with the provider's error description
//!   attached; the stale token is never silently reused.
//!
//! Refresh is not mutex-protected: two concurrent callers may both observe
//! a near-expired token and both refresh. The atomic last-write-wins
//! update makes the redundant refresh harmless, only wasteful.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::time::{Clock, SystemClock};
use chrono::Duration as ChronoDuration;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Result};
use crate::store::ConnectionStore;
use crate::types::{ClientCredentials, ServiceConnection, TokenUpdate};

/// Safety margin before expiry at which a token counts as expiring (5 minutes)
const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// Timeout for token endpoint requests
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Token endpoint response shape shared by OAuth providers.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Error envelope returned by token endpoints on rejection.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Token lifecycle manager.
pub struct TokenManager {
    http_client: Arc<dyn HttpClient>,
    store: Arc<dyn ConnectionStore>,
    clock: Arc<dyn Clock>,
    /// Process-wide application credentials, used when a connection has no
    /// override pair
    default_credentials: Option<ClientCredentials>,
}

impl TokenManager {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        store: Arc<dyn ConnectionStore>,
        default_credentials: Option<ClientCredentials>,
    ) -> Self {
        Self::with_clock(http_client, store, default_credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(
        http_client: Arc<dyn HttpClient>,
        store: Arc<dyn ConnectionStore>,
        default_credentials: Option<ClientCredentials>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            store,
            clock,
            default_credentials,
        }
    }

    /// Get a valid access token for the connection, refreshing if needed.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoRefreshToken`] - token is expiring and the
    ///   connection has no refresh path; re-authorization is required
    /// - [`AuthError::MissingClientCredentials`] - neither the connection
    ///   nor the process has an OAuth application configured
    /// - [`AuthError::TokenRefreshFailed`] - the provider rejected the
    ///   refresh
    #[instrument(skip(self, connection), fields(connection_id = %connection.id, provider = %connection.provider))]
    pub async fn get_valid_token(&self, connection: &ServiceConnection) -> Result<String> {
        let now = self.clock.now();

        // A token with no recorded expiry cannot be trusted past this
        // point and goes through the refresh path.
        if let Some(expires_at) = connection.expires_at {
            if expires_at > now + ChronoDuration::seconds(TOKEN_REFRESH_MARGIN_SECS) {
                debug!("Token is valid, no refresh needed");
                return Ok(connection.access_token.clone());
            }
        }

        info!("Token expired or expiring soon, refreshing");

        let refresh_token = connection
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NoRefreshToken)?;

        let credentials = connection
            .credentials_override
            .as_ref()
            .or(self.default_credentials.as_ref())
            .ok_or_else(|| {
                AuthError::MissingClientCredentials(connection.provider.as_str().to_string())
            })?;

        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", credentials.client_id.as_str());
        params.insert("client_secret", credentials.client_secret.as_str());

        let request = HttpRequest::new(HttpMethod::Post, connection.provider.token_url())
            .form(&params)
            .map_err(|e| AuthError::Network(e.to_string()))?
            .timeout(TOKEN_REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.is_success() {
            let description = response
                .json::<TokenErrorResponse>()
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| format!("token endpoint returned {}", response.status));

            warn!(status = response.status, "Token refresh rejected by provider");
            return Err(AuthError::TokenRefreshFailed(description));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::TokenRefreshFailed(format!("unparseable response: {}", e)))?;

        let expires_at = now + ChronoDuration::seconds(token_response.expires_in);
        let access_token = token_response.access_token.clone();

        self.store
            .update_tokens(
                connection.id,
                TokenUpdate {
                    access_token: token_response.access_token,
                    refresh_token: token_response.refresh_token,
                    expires_at,
                },
            )
            .await?;

        info!(
            expires_in = token_response.expires_in,
            "Token refreshed successfully"
        );
        Ok(access_token)
    }
}
