//! Runtime Configuration
//!
//! Environment-driven settings shared by the domain crates. Every value has
//! a documented default; `Settings::from_env` only overrides what the
//! environment actually provides.

use std::time::Duration;

use crate::error::{Error, Result};

/// Process-wide settings.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | `SPOTIFY_CLIENT_ID` | unset | Default catalog OAuth client id |
/// | `SPOTIFY_CLIENT_SECRET` | unset | Default catalog OAuth client secret |
/// | `DISCOGS_TOKEN` | unset | Personal access token for the Discogs API |
/// | `PSC_USER_AGENT` | `playlist-sync-core/0.1.0` | User-Agent for outbound requests |
/// | `PSC_SYNC_INTERVAL_SECS` | 21600 (6 h) | Scheduler tick interval |
/// | `PSC_SYNC_STALE_SECS` | 86400 (24 h) | Age after which a playlist is sync-due |
/// | `PSC_PURGE_AFTER_DAYS` | 30 | Soft-delete retention before hard purge |
/// | `PSC_LOCK_TTL_SECS` | 300 | Distributed lock expiry |
#[derive(Debug, Clone)]
pub struct Settings {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub discogs_token: Option<String>,
    pub user_agent: String,
    pub sync_interval: Duration,
    pub sync_stale_after: Duration,
    pub purge_after_days: u32,
    pub lock_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spotify_client_id: None,
            spotify_client_secret: None,
            discogs_token: None,
            user_agent: "playlist-sync-core/0.1.0".to_string(),
            sync_interval: Duration::from_secs(6 * 60 * 60),
            sync_stale_after: Duration::from_secs(24 * 60 * 60),
            purge_after_days: 30,
            lock_ttl: Duration::from_secs(300),
        }
    }
}

impl Settings {
    /// Build settings from the process environment, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when a set variable fails to parse (e.g. a
    /// non-numeric interval).
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        settings.spotify_client_id = env_opt("SPOTIFY_CLIENT_ID");
        settings.spotify_client_secret = env_opt("SPOTIFY_CLIENT_SECRET");
        settings.discogs_token = env_opt("DISCOGS_TOKEN");

        if let Some(ua) = env_opt("PSC_USER_AGENT") {
            settings.user_agent = ua;
        }
        if let Some(secs) = env_parse::<u64>("PSC_SYNC_INTERVAL_SECS")? {
            settings.sync_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("PSC_SYNC_STALE_SECS")? {
            settings.sync_stale_after = Duration::from_secs(secs);
        }
        if let Some(days) = env_parse::<u32>("PSC_PURGE_AFTER_DAYS")? {
            settings.purge_after_days = days;
        }
        if let Some(secs) = env_parse::<u64>("PSC_LOCK_TTL_SECS")? {
            settings.lock_ttl = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_opt(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, raw))),
    }
}
