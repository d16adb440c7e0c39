//! Error types for the Spotify connector

use thiserror::Error;

/// Spotify connector errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Access token invalid or lacking scope
    #[error("Spotify rejected credentials (status {0})")]
    Unauthorized(u16),

    /// API request returned an error
    #[error("Spotify API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded and retries exhausted
    #[error("Spotify rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    /// Failed to parse API response
    #[error("Failed to parse Spotify response: {0}")]
    Parse(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type for Spotify operations
pub type Result<T> = std::result::Result<T, SpotifyError>;

impl From<SpotifyError> for bridge_traits::error::BridgeError {
    fn from(error: SpotifyError) -> Self {
        bridge_traits::error::BridgeError::OperationFailed(error.to_string())
    }
}
