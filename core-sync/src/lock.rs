//! # Distributed Mutex
//!
//! A named lock backed by the shared key-value store, used to serialize
//! sync runs per playlist across process instances.
//!
//! The store, not the holder, is the sole authority on lock validity:
//! acquisition is an atomic set-if-absent with expiry, and a crashed
//! holder's lock self-heals when the key expires. The expiry must always
//! exceed the expected critical-section duration.
//!
//! ## Modes
//!
//! - **Non-blocking** (default): a failed acquisition returns immediately,
//!   distinguishing "already held" from "store unreachable".
//! - **Blocking**: retries on a fixed interval until acquired or an
//!   optional maximum wait elapses.
//!
//! Release is idempotent; deleting an already-expired key is logged, never
//! an error.

use bridge_traits::kv::KeyValueStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Result, SyncError};

/// Prefix applied to every lock key in the shared store.
const KEY_PREFIX: &str = "lock:";

/// Default spacing between blocking-mode acquisition attempts.
const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// A named, expiry-backed lock.
pub struct SyncLock {
    store: Arc<dyn KeyValueStore>,
    name: String,
    key: String,
    ttl: Duration,
    blocking: bool,
    max_wait: Option<Duration>,
    retry_interval: Duration,
    acquired: bool,
}

impl SyncLock {
    /// Create a non-blocking lock. `ttl` must exceed the expected
    /// critical-section duration.
    pub fn new(store: Arc<dyn KeyValueStore>, name: impl Into<String>, ttl: Duration) -> Self {
        let name = name.into();
        let key = format!("{}{}", KEY_PREFIX, name);
        Self {
            store,
            name,
            key,
            ttl,
            blocking: false,
            max_wait: None,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            acquired: false,
        }
    }

    /// Switch to blocking mode, retrying until acquired or `max_wait`
    /// elapses (`None` waits indefinitely).
    pub fn blocking(mut self, max_wait: Option<Duration>) -> Self {
        self.blocking = true;
        self.max_wait = max_wait;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Attempt to acquire the lock.
    ///
    /// # Errors
    ///
    /// - [`SyncError::LockContention`] - held elsewhere (non-blocking mode)
    /// - [`SyncError::LockTimeout`] - `max_wait` elapsed (blocking mode)
    /// - [`SyncError::LockUnavailable`] - the store cannot be reached
    pub async fn acquire(&mut self) -> Result<()> {
        let start = Instant::now();

        loop {
            match self.store.set_if_absent(&self.key, "1", self.ttl).await {
                Ok(true) => {
                    self.acquired = true;
                    debug!(lock = %self.name, "Acquired lock");
                    return Ok(());
                }
                Ok(false) => {
                    if !self.blocking {
                        return Err(SyncError::LockContention {
                            name: self.name.clone(),
                        });
                    }
                    if let Some(max_wait) = self.max_wait {
                        let waited = start.elapsed();
                        if waited >= max_wait {
                            return Err(SyncError::LockTimeout {
                                name: self.name.clone(),
                                waited_ms: waited.as_millis(),
                            });
                        }
                    }
                    sleep(self.retry_interval).await;
                }
                Err(e) => {
                    return Err(SyncError::LockUnavailable(e.to_string()));
                }
            }
        }
    }

    /// Release the lock.
    ///
    /// Idempotent: releasing an unheld or already-expired lock only logs.
    /// Store failures during release are logged too; the key's expiry is
    /// the backstop.
    pub async fn release(&mut self) {
        if !self.acquired {
            return;
        }

        match self.store.delete(&self.key).await {
            Ok(true) => debug!(lock = %self.name, "Released lock"),
            Ok(false) => warn!(lock = %self.name, "Lock key already expired or deleted"),
            Err(e) => warn!(lock = %self.name, error = %e, "Failed to delete lock key"),
        }
        self.acquired = false;
    }

    /// Whether this instance currently believes it holds the lock.
    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::MemoryKeyValueStore;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Wraps a store and counts calls to `set_if_absent`.
    struct CountingStore {
        inner: MemoryKeyValueStore,
        set_calls: AtomicU32,
    }

    impl CountingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryKeyValueStore::new(),
                set_calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl KeyValueStore for CountingStore {
        async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> BridgeResult<bool> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.set_if_absent(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> BridgeResult<bool> {
            self.inner.delete(key).await
        }
    }

    /// A store whose backend is down.
    struct UnreachableStore;

    #[async_trait]
    impl KeyValueStore for UnreachableStore {
        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> BridgeResult<bool> {
            Err(BridgeError::StoreUnreachable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> BridgeResult<bool> {
            Err(BridgeError::StoreUnreachable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut lock = SyncLock::new(store.clone(), "playlist_sync:1", Duration::from_secs(30));

        lock.acquire().await.unwrap();
        assert!(lock.is_acquired());

        lock.release().await;
        assert!(!lock.is_acquired());

        // Reacquirable after release.
        let mut second = SyncLock::new(store, "playlist_sync:1", Duration::from_secs(30));
        second.acquire().await.unwrap();
    }

    #[tokio::test]
    async fn test_non_blocking_contention_fails_with_single_store_call() {
        let store = CountingStore::new();

        let mut holder = SyncLock::new(store.clone(), "contended", Duration::from_secs(30));
        holder.acquire().await.unwrap();

        let calls_before = store.set_calls.load(Ordering::SeqCst);
        let mut loser = SyncLock::new(store.clone(), "contended", Duration::from_secs(30));
        let result = loser.acquire().await;

        assert!(matches!(result, Err(SyncError::LockContention { .. })));
        // Exactly one additional store round-trip; no retries in
        // non-blocking mode.
        assert_eq!(store.set_calls.load(Ordering::SeqCst), calls_before + 1);
    }

    #[tokio::test]
    async fn test_blocking_mode_waits_for_release() {
        let store = Arc::new(MemoryKeyValueStore::new());

        let mut holder = SyncLock::new(store.clone(), "handoff", Duration::from_secs(30));
        holder.acquire().await.unwrap();

        let store_clone = store.clone();
        let waiter = tokio::spawn(async move {
            let mut lock = SyncLock::new(store_clone, "handoff", Duration::from_secs(30))
                .blocking(Some(Duration::from_secs(5)))
                .with_retry_interval(Duration::from_millis(10));
            lock.acquire().await
        });

        sleep(Duration::from_millis(50)).await;
        holder.release().await;

        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_blocking_mode_times_out() {
        let store = Arc::new(MemoryKeyValueStore::new());

        let mut holder = SyncLock::new(store.clone(), "stuck", Duration::from_secs(30));
        holder.acquire().await.unwrap();

        let mut lock = SyncLock::new(store, "stuck", Duration::from_secs(30))
            .blocking(Some(Duration::from_millis(50)))
            .with_retry_interval(Duration::from_millis(10));
        let result = lock.acquire().await;

        assert!(matches!(result, Err(SyncError::LockTimeout { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_distinguished_from_contention() {
        let mut lock = SyncLock::new(Arc::new(UnreachableStore), "any", Duration::from_secs(30));
        let result = lock.acquire().await;
        assert!(matches!(result, Err(SyncError::LockUnavailable(_))));
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut lock = SyncLock::new(store.clone(), "idem", Duration::from_secs(30));

        lock.acquire().await.unwrap();
        // Simulate expiry: the key vanishes underneath the holder.
        store.delete("lock:idem").await.unwrap();

        lock.release().await;
        lock.release().await;
        assert!(!lock.is_acquired());
    }
}
