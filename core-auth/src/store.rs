//! Connection Persistence Seam
//!
//! The relational store holding `ServiceConnection` records is a
//! collaborator; this module defines the two operations the token
//! lifecycle and sync engine need from it, plus an in-memory
//! implementation used by tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::types::{ConnectionId, ProviderKind, ServiceConnection, TokenUpdate};

/// Read/write access to persisted connections.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Find the connection a user holds for a provider, if any.
    async fn find_for_user(
        &self,
        owner_id: Uuid,
        provider: ProviderKind,
    ) -> Result<Option<ServiceConnection>>;

    /// Apply a token refresh as one atomic write.
    ///
    /// The access token and expiry always change together; the refresh
    /// token changes only when the update carries a rotated one. Backing
    /// implementations must not split this into independent column
    /// writes.
    async fn update_tokens(&self, id: ConnectionId, update: TokenUpdate) -> Result<()>;
}

/// In-memory connection store.
#[derive(Default)]
pub struct MemoryConnectionStore {
    connections: Mutex<HashMap<ConnectionId, ServiceConnection>>,
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, connection: ServiceConnection) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection.id, connection);
    }

    pub async fn get(&self, id: ConnectionId) -> Option<ServiceConnection> {
        let connections = self.connections.lock().await;
        connections.get(&id).cloned()
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn find_for_user(
        &self,
        owner_id: Uuid,
        provider: ProviderKind,
    ) -> Result<Option<ServiceConnection>> {
        let connections = self.connections.lock().await;
        Ok(connections
            .values()
            .find(|c| c.owner_id == owner_id && c.provider == provider)
            .cloned())
    }

    async fn update_tokens(&self, id: ConnectionId, update: TokenUpdate) -> Result<()> {
        let mut connections = self.connections.lock().await;
        let connection = connections
            .get_mut(&id)
            .ok_or_else(|| AuthError::Store(format!("Connection {} not found", id)))?;

        connection.access_token = update.access_token;
        connection.expires_at = Some(update.expires_at);
        if let Some(rotated) = update.refresh_token {
            connection.refresh_token = Some(rotated);
        }
        Ok(())
    }
}
