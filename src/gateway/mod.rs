//! Gateway orchestration.
//!
//! # Data Flow
//! ```text
//! call(interface, method, version, params)
//!     → readiness check (key configured, schema loaded)
//!     → registry: normalize version, existence, required parameters
//!     → inject credential
//!     → cache layer (lookup; on miss)
//!     → scheduler (throttle, single flight)
//!     → transport
//!     → status interpretation, JSON decode
//! ```
//!
//! # Design Decisions
//! - All state lives in the `Gateway` value; nothing is global
//! - The credential is swapped atomically and never written to disk
//! - The key probe bypasses the cache since the credential is not part of the key

pub mod state;

use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::cache::{CacheLayer, CacheStats, CacheStore, MemoryStore, CREDENTIAL_PARAM};
use crate::config::{GatewayConfig, UpstreamConfig};
use crate::error::{CallError, ConfigError, InitError, SchemaError};
use crate::observability::metrics;
use crate::registry::{normalize_version, MethodRegistry, RawMethodListing};
use crate::scheduler::{RequestScheduler, SchedulerSettings};
use crate::upstream::{HttpTransport, Transport};

pub use state::GatewayState;

/// Front door to the remote API.
pub struct Gateway {
    registry: MethodRegistry,
    cache: CacheLayer,
    scheduler: RequestScheduler,
    api_key: ArcSwapOption<String>,
    base_url: Url,
    upstream: UpstreamConfig,
}

impl Gateway {
    /// Assemble a gateway over the given transport and cache store.
    ///
    /// Spawns the scheduler worker, so it must run inside a tokio runtime.
    pub fn new(
        config: &GatewayConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self, InitError> {
        let base_url = Url::parse(&config.upstream.base_url)?;
        let settings = SchedulerSettings::from_config(&config.scheduler, &config.upstream);

        Ok(Self {
            registry: MethodRegistry::new(),
            cache: CacheLayer::new(store, &config.cache),
            scheduler: RequestScheduler::new(transport, settings),
            api_key: ArcSwapOption::empty(),
            base_url,
            upstream: config.upstream.clone(),
        })
    }

    /// Gateway over HTTP with an in-memory cache.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, InitError> {
        let transport = HttpTransport::new(Duration::from_secs(config.upstream.request_timeout_secs))?;
        let store = MemoryStore::with_capacity(config.cache.max_entries);
        Self::new(config, Arc::new(transport), Arc::new(store))
    }

    pub fn state(&self) -> GatewayState {
        GatewayState::derive(self.api_key.load().is_some(), self.registry.is_ready())
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &RequestScheduler {
        &self.scheduler
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Entries currently held by the cache store, if it can tell.
    pub async fn cache_entries(&self) -> Option<usize> {
        self.cache.entries().await
    }

    /// Validate `api_key` with one probe call and adopt it on success.
    ///
    /// The probe goes through the scheduler so it respects the rate limit.
    /// A failed probe leaves the current key and state untouched.
    pub async fn configure(&self, api_key: &str) -> Result<(), ConfigError> {
        let mut params = self.upstream.probe_params.clone();
        params.insert(CREDENTIAL_PARAM.to_string(), api_key.to_string());
        let url = self.build_url(&self.upstream.probe_path, &params);

        let response = self.scheduler.enqueue(url).await.inspect_err(|e| {
            tracing::error!(error = %e, "API key validation endpoint unreachable");
        })?;

        match response.status {
            200 => {
                self.api_key.store(Some(Arc::new(api_key.to_string())));
                tracing::info!(state = %self.state(), "API key accepted");
                Ok(())
            }
            401 => {
                tracing::warn!("API key rejected by upstream");
                Err(ConfigError::InvalidApiKey)
            }
            status => {
                tracing::warn!(status, "Unexpected status from API key probe");
                Err(ConfigError::UnexpectedUpstreamStatus(status))
            }
        }
    }

    /// Fetch the supported-method listing and replace the registry.
    pub async fn load_schema(&self) -> Result<(), SchemaError> {
        let api_key = self.api_key.load_full().ok_or(SchemaError::NotConfigured)?;

        let path = self.upstream.listing_path.as_str();
        let params = BTreeMap::from([(CREDENTIAL_PARAM.to_string(), api_key.to_string())]);
        let url = self.build_url(path, &params);

        let response = self
            .cache
            .fetch_with_cache(path, &params, self.cache.ttl_for(path), || {
                self.scheduler.enqueue(url)
            })
            .await?;

        match response.status {
            200 => {
                let listing = RawMethodListing::from_body(&response.body).inspect_err(|e| {
                    tracing::error!(error = %e, "Method listing could not be decoded");
                })?;
                self.registry.load_listing(listing);
                tracing::info!(
                    from_cache = response.from_cache,
                    methods = self.registry.method_count(),
                    state = %self.state(),
                    "Method listing loaded"
                );
                Ok(())
            }
            401 => Err(SchemaError::InvalidApiKey),
            status => Err(SchemaError::UnexpectedUpstreamStatus(status)),
        }
    }

    /// Call one remote method and return its decoded JSON body.
    ///
    /// `version` may be spelled "2", "v2" or "v0002". A `key` entry in
    /// `params` is replaced by the configured credential. With
    /// `allow_cache` false the cache is neither read nor written.
    pub async fn call(
        &self,
        interface: &str,
        method: &str,
        version: &str,
        mut params: BTreeMap<String, String>,
        allow_cache: bool,
    ) -> Result<Value, CallError> {
        let start = Instant::now();

        let (api_key, version) = match self.admit(interface, method, version, &params) {
            Ok(admitted) => admitted,
            Err(e) => {
                tracing::debug!(interface = %interface, method = %method, error = %e, "Call rejected");
                metrics::record_call("-", e.kind(), start);
                return Err(e);
            }
        };

        params.insert(CREDENTIAL_PARAM.to_string(), api_key.to_string());
        let path = format!("/{}/{}/v{}/", interface, method, version);

        match self.execute(&path, &params, allow_cache).await {
            Ok((value, cache)) => {
                tracing::info!(
                    path = %path,
                    cache,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Call completed"
                );
                metrics::record_call(&path, "ok", start);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path,
                    error = %e,
                    retriable = e.is_retriable(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Call failed"
                );
                metrics::record_call(&path, e.kind(), start);
                Err(e)
            }
        }
    }

    /// Checks that run before anything leaves the process.
    fn admit(
        &self,
        interface: &str,
        method: &str,
        version: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<(Arc<String>, String), CallError> {
        let api_key = match self.api_key.load_full() {
            Some(key) if self.registry.is_ready() => key,
            _ => return Err(CallError::NotReady),
        };

        let version = normalize_version(version)?;
        if !self.registry.exists(interface, method, &version) {
            return Err(CallError::MethodNotFound {
                interface: interface.to_string(),
                method: method.to_string(),
                version,
            });
        }

        // The credential is always supplied by the gateway itself.
        let provided = params
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(CREDENTIAL_PARAM));
        self.registry.validate(interface, method, &version, provided)?;

        Ok((api_key, version))
    }

    async fn execute(
        &self,
        path: &str,
        params: &BTreeMap<String, String>,
        allow_cache: bool,
    ) -> Result<(Value, &'static str), CallError> {
        let url = self.build_url(path, params);

        let (status, body, cache) = if allow_cache {
            let response = self
                .cache
                .fetch_with_cache(path, params, self.cache.ttl_for(path), || {
                    self.scheduler.enqueue(url)
                })
                .await?;
            let outcome = if response.from_cache { "hit" } else { "miss" };
            (response.status, response.body, outcome)
        } else {
            let response = self.scheduler.enqueue(url).await?;
            (response.status, response.body, "bypass")
        };

        match status {
            200 => serde_json::from_str(&body)
                .map(|value| (value, cache))
                .map_err(|e| CallError::MalformedResponse(e.to_string())),
            401 => Err(CallError::InvalidApiKey),
            status => Err(CallError::UnexpectedUpstreamStatus(status)),
        }
    }

    fn build_url(&self, path: &str, params: &BTreeMap<String, String>) -> String {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params.iter());
        }
        url.to_string()
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("state", &self.state())
            .field("base_url", &self.base_url.as_str())
            .field("methods", &self.registry.method_count())
            .finish()
    }
}
