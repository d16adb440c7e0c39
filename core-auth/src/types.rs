use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a provider connection.
///
/// Each connection represents one user's authorization against one
/// streaming provider. A user can hold at most one connection per
/// provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a connection ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ConnectionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Supported streaming providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Spotify Web API
    Spotify,
}

impl ProviderKind {
    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Spotify => "Spotify",
        }
    }

    /// Provider identifier string used for storage and track refs
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Spotify => "spotify",
        }
    }

    /// OAuth token endpoint for this provider
    pub fn token_url(&self) -> &'static str {
        match self {
            ProviderKind::Spotify => "https://accounts.spotify.com/api/token",
        }
    }

    /// Parse a provider kind from its identifier string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spotify" => Some(ProviderKind::Spotify),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// OAuth client credentials.
///
/// Usually the process-wide application credentials; a connection may carry
/// an override pair when the user brought their own application.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// A user's authorization against a streaming provider.
///
/// Created on first successful provider authorization; the token fields are
/// mutated on every refresh. The persistence collaborator encrypts the
/// secret fields at rest; this struct only ever holds plaintext in memory,
/// and its `Debug` output redacts them.
///
/// Invariant: `access_token` and `expires_at` describe the same grant; they
/// are only ever written together through
/// [`ConnectionStore::update_tokens`](crate::store::ConnectionStore::update_tokens).
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConnection {
    pub id: ConnectionId,
    /// Owning user
    pub owner_id: Uuid,
    pub provider: ProviderKind,
    /// Provider-side account identifier
    pub external_user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// When the access token expires; `None` when the provider did not
    /// report a lifetime
    pub expires_at: Option<DateTime<Utc>>,
    /// Connection-specific OAuth application override
    pub credentials_override: Option<ClientCredentials>,
    /// Region code applied to catalog searches
    pub market: Option<String>,
}

impl fmt::Debug for ServiceConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConnection")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("provider", &self.provider)
            .field("external_user_id", &self.external_user_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("market", &self.market)
            .finish()
    }
}

/// Atomic token update applied to a connection after a successful refresh.
///
/// `refresh_token` is `None` when the provider did not rotate it; the
/// stored refresh token is kept in that case.
#[derive(Clone)]
pub struct TokenUpdate {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for TokenUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenUpdate")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn connection() -> ServiceConnection {
        ServiceConnection {
            id: ConnectionId::new(),
            owner_id: Uuid::new_v4(),
            provider: ProviderKind::Spotify,
            external_user_id: "spotify_user".to_string(),
            access_token: "secret_access".to_string(),
            refresh_token: Some("secret_refresh".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            credentials_override: None,
            market: Some("DE".to_string()),
        }
    }

    #[test]
    fn test_connection_id_roundtrip() {
        let id = ConnectionId::new();
        let parsed = ConnectionId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse("spotify"), Some(ProviderKind::Spotify));
        assert_eq!(ProviderKind::parse("Spotify"), Some(ProviderKind::Spotify));
        assert_eq!(ProviderKind::parse("tidal"), None);
    }

    #[test]
    fn test_provider_token_url() {
        assert!(ProviderKind::Spotify.token_url().starts_with("https://accounts.spotify.com"));
    }

    #[test]
    fn test_connection_debug_redacts_secrets() {
        let conn = connection();
        let debug = format!("{:?}", conn);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret_access"));
        assert!(!debug.contains("secret_refresh"));
    }

    #[test]
    fn test_connection_serialization_roundtrip() {
        let conn = connection();
        let json = serde_json::to_string(&conn).unwrap();
        let deserialized: ServiceConnection = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, conn.id);
        assert_eq!(deserialized.access_token, conn.access_token);
        assert_eq!(deserialized.market, conn.market);
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = ClientCredentials {
            client_id: "app-id".to_string(),
            client_secret: "app-secret".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("app-id"));
        assert!(!debug.contains("app-secret"));
    }
}
