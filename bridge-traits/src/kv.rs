//! Shared Key-Value Store Abstraction
//!
//! Minimal surface over a Redis-class store: an atomic
//! set-if-absent-with-expiry and a delete. This is the entire contract the
//! distributed lock relies on; everything else a concrete store offers is
//! deliberately out of reach.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Atomic key-value operations against a store shared by all process
/// instances.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::kv::KeyValueStore;
/// use std::time::Duration;
///
/// async fn try_claim(store: &dyn KeyValueStore) -> Result<bool> {
///     store
///         .set_if_absent("lock:playlist_sync:42", "1", Duration::from_secs(300))
///         .await
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Atomically set `key` to `value` with the given expiry, only if the
    /// key is currently absent (SET NX EX semantics).
    ///
    /// Returns `true` if the key was set, `false` if it already existed.
    /// The expiry is always applied; callers must never create keys that
    /// outlive a crashed holder indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::StoreUnreachable` if the store cannot be
    /// contacted.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Delete a key.
    ///
    /// Returns `true` if a key was removed, `false` if it was already
    /// absent (expired or never set). Absence is not an error.
    async fn delete(&self, key: &str) -> Result<bool>;
}
