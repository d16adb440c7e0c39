//! In-Process Key-Value Store
//!
//! An expiry-honoring in-memory implementation of [`KeyValueStore`] with
//! SET-NX-EX semantics. Suitable for tests and single-node deployments;
//! multi-instance deployments point the same trait at a shared store.

use async_trait::async_trait;
use bridge_traits::{error::Result, kv::KeyValueStore};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory key-value store with per-key expiry.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live (non-expired) value. Test helper.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        // An expired entry counts as absent.
        if let Some(existing) = entries.get(key) {
            if existing.expires_at > now {
                return Ok(false);
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Key set");
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.remove(key) {
            Some(entry) if entry.expires_at > now => Ok(true),
            _ => Ok(false),
        }
    }
}
