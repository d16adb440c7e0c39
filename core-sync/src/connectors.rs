//! Catalog Connector Wiring
//!
//! The engine obtains a fresh token per run and needs a connector
//! authenticated with it; this factory seam builds one per (connection,
//! token) pair and declares which providers the engine supports.

use bridge_traits::catalog::CatalogProvider;
use bridge_traits::http::HttpClient;
use core_auth::{ProviderKind, ServiceConnection};
use provider_spotify::SpotifyConnector;
use std::sync::Arc;

/// Builds authenticated catalog connectors.
pub trait ConnectorFactory: Send + Sync {
    /// Whether this factory can build a connector for the provider.
    fn supports(&self, provider: ProviderKind) -> bool;

    /// Build a connector for the connection, authenticated with
    /// `access_token`.
    fn connector(
        &self,
        connection: &ServiceConnection,
        access_token: String,
    ) -> Arc<dyn CatalogProvider>;
}

/// Production factory backed by the Spotify connector.
pub struct SpotifyConnectorFactory {
    http_client: Arc<dyn HttpClient>,
}

impl SpotifyConnectorFactory {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }
}

impl ConnectorFactory for SpotifyConnectorFactory {
    fn supports(&self, provider: ProviderKind) -> bool {
        matches!(provider, ProviderKind::Spotify)
    }

    fn connector(
        &self,
        connection: &ServiceConnection,
        access_token: String,
    ) -> Arc<dyn CatalogProvider> {
        Arc::new(
            SpotifyConnector::new(self.http_client.clone(), access_token)
                .with_market(connection.market.clone()),
        )
    }
}
