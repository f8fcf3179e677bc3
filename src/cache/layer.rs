//! Cache-aside around outbound fetches.

use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::key::compute_key;
use super::policy::TtlPolicy;
use super::store::CacheStore;
use crate::config::CacheConfig;
use crate::observability::metrics;
use crate::upstream::RawResponse;

/// Response handed back by [`CacheLayer::fetch_with_cache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
    pub from_cache: bool,
}

impl CachedResponse {
    fn fresh(response: RawResponse) -> Self {
        Self {
            status: response.status,
            body: response.body,
            from_cache: false,
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub store_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    store_errors: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, event: &'static str) {
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache(event);
    }
}

/// Looks responses up in a [`CacheStore`] before fetching, and stores
/// successful ones afterwards.
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    policy: TtlPolicy,
    enabled: bool,
    key_prefix: String,
    counters: Counters,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            policy: TtlPolicy::from_config(config),
            enabled: config.enabled,
            key_prefix: config.key_prefix.clone(),
            counters: Counters::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Lifetime in seconds for responses of `path`.
    pub fn ttl_for(&self, path: &str) -> u64 {
        self.policy.ttl_for(path)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stores: self.counters.stores.load(Ordering::Relaxed),
            store_errors: self.counters.store_errors.load(Ordering::Relaxed),
        }
    }

    /// Entries held by the backing store, or `None` when it cannot be asked.
    pub async fn entries(&self) -> Option<usize> {
        match self.store.len().await {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "Cache size unavailable");
                None
            }
        }
    }

    /// Serve `path` from the cache, or run `do_real_fetch` and cache a 200.
    ///
    /// Store failures never fail the call: a failed read is a miss and a
    /// failed write is logged.
    pub async fn fetch_with_cache<F, Fut, E>(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
        expiry_secs: u64,
        do_real_fetch: F,
    ) -> Result<CachedResponse, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RawResponse, E>>,
    {
        if !self.enabled {
            Counters::bump(&self.counters.misses, "miss");
            return do_real_fetch().await.map(CachedResponse::fresh);
        }

        let store_key = format!("{}{}", self.key_prefix, compute_key(path, params));

        if let Some(body) = self.read(&store_key).await {
            Counters::bump(&self.counters.hits, "hit");
            tracing::debug!(path = %path, "Cache hit");
            return Ok(CachedResponse {
                status: 200,
                body,
                from_cache: true,
            });
        }

        Counters::bump(&self.counters.misses, "miss");
        tracing::debug!(path = %path, "Cache miss");

        let response = do_real_fetch().await?;
        if response.is_success() {
            self.write(&store_key, &response.body, expiry_secs).await;
        }
        Ok(CachedResponse::fresh(response))
    }

    async fn read(&self, store_key: &str) -> Option<String> {
        match self.store.get(store_key).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(body) => Some(body),
                Err(_) => {
                    tracing::warn!(key = %store_key, "Cached entry is not valid UTF-8, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write(&self, store_key: &str, body: &str, expiry_secs: u64) {
        let result = match self.store.set(store_key, body.as_bytes()).await {
            Ok(()) => self.store.expire(store_key, expiry_secs).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Counters::bump(&self.counters.stores, "store"),
            Err(e) => {
                Counters::bump(&self.counters.store_errors, "store_error");
                tracing::warn!(store = self.store.name(), error = %e, "Cache write failed");
            }
        }
    }
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("store", &self.store.name())
            .field("enabled", &self.enabled)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
