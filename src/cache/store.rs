//! Key-value store behind the cache layer.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Failure talking to the backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cache store error: {0}")]
pub struct StoreError(pub String);

/// Get/set-with-expiry store keyed by opaque strings.
///
/// `set` stores a value without expiry; `expire` attaches a TTL to an
/// existing key, as Redis does.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    async fn expire(&self, key: &str, seconds: u64) -> Result<(), StoreError>;
    /// Entries currently held, expired ones not yet reclaimed included.
    async fn len(&self) -> Result<usize, StoreError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    stored_at: Instant,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Default for [`MemoryStore::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// In-process store with passive expiry.
///
/// Every `set` sweeps expired entries and, once `max_entries` is reached,
/// evicts the oldest writes to make room.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
    max_entries: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before - self.entries.len()
    }

    fn evict_if_needed(&self, incoming: &str) {
        let purged = self.purge_expired();
        let mut evicted = 0;
        while self.entries.len() >= self.max_entries && !self.entries.contains_key(incoming) {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().stored_at)
                .map(|e| e.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        if purged + evicted > 0 {
            tracing::debug!(purged, evicted, "Memory store reclaimed entries");
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        // Removed outside of the read guard.
        if expired {
            self.entries.remove_if(key, |_, e| e.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.evict_if_needed(key);
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                stored_at: Instant::now(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<(), StoreError> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + Duration::from_secs(seconds));
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_set_get_expire() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", b"v").await.unwrap();
        store.expire("k", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_and_clears_ttl() {
        let store = MemoryStore::new();
        store.set("k", b"old").await.unwrap();
        store.expire("k", 1).await.unwrap();
        store.set("k", b"new").await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        for key in ["a", "b", "c"] {
            store.set(key, b"v").await.unwrap();
        }
        store.expire("a", 1).await.unwrap();
        store.expire("b", 1).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expire_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.expire("missing", 10).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_reclaims_expired_entries() {
        let store = MemoryStore::new();
        for i in 0..1000 {
            let key = format!("k{i}");
            store.set(&key, b"v").await.unwrap();
            store.expire(&key, 1).await.unwrap();
        }
        assert_eq!(store.len().await.unwrap(), 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        store.set("fresh", b"v").await.unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.get("fresh").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let store = MemoryStore::with_capacity(2);
        store.set("a", b"1").await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        store.set("b", b"2").await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        store.set("c", b"3").await.unwrap();

        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("c").await.unwrap(), Some(b"3".to_vec()));

        // Overwriting an existing key at capacity evicts nothing.
        store.set("c", b"4").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), Some(b"2".to_vec()));
    }
}
