//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Remote API settings (base URL, credential, probe and listing methods).
    pub upstream: UpstreamConfig,

    /// Outbound throttling settings.
    pub scheduler: SchedulerConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Total time an inbound request may take, queue wait included.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the remote API.
    pub base_url: String,

    /// API key. `STEAM_API_KEY` in the environment takes precedence.
    pub api_key: String,

    /// Per-attempt timeout for an outbound call in seconds.
    pub request_timeout_secs: u64,

    /// Cheap method used to validate a key.
    pub probe_path: String,

    /// Query parameters sent with the probe.
    pub probe_params: BTreeMap<String, String>,

    /// Method returning the list of supported methods.
    pub listing_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.steampowered.com".to_string(),
            api_key: String::new(),
            request_timeout_secs: 10,
            probe_path: "/IDOTA2Match_570/GetMatchDetails/v1/".to_string(),
            probe_params: BTreeMap::from([("match_id".to_string(), "-1".to_string())]),
            listing_path: "/ISteamWebAPIUtil/GetSupportedAPIList/v1/".to_string(),
        }
    }
}

/// Outbound call scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum spacing between the start of two dispatches in milliseconds.
    pub dispatch_interval_ms: u64,

    /// Cooldown after the remote signals overload, in seconds.
    pub busy_cooldown_secs: u64,

    /// Status code the remote uses to signal overload.
    pub busy_status: u16,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_ms: 1000,
            busy_cooldown_secs: 30,
            busy_status: 503,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable response caching.
    pub enabled: bool,

    /// TTL for paths without an explicit rule, in seconds.
    pub default_ttl_secs: u64,

    /// Prefix applied to every key written to the store.
    pub key_prefix: String,

    /// Most entries the in-memory store holds before evicting the oldest.
    pub max_entries: usize,

    /// Per-path TTL overrides, applied on top of the built-in table.
    #[serde(default)]
    pub ttl: Vec<TtlRule>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: 3600,
            key_prefix: "steam-gateway:".to_string(),
            max_entries: 10_000,
            ttl: Vec::new(),
        }
    }
}

/// A TTL override for one outbound path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TtlRule {
    /// Outbound path, e.g. "/IEconDOTA2_570/GetHeroes/v1/".
    pub path: String,

    /// Time to live in seconds.
    pub ttl_secs: u64,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoints configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the /admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.scheduler.dispatch_interval_ms, 1000);
        assert_eq!(config.scheduler.busy_cooldown_secs, 30);
        assert_eq!(config.cache.default_ttl_secs, 3600);
        assert_eq!(config.upstream.probe_params.get("match_id").map(String::as_str), Some("-1"));
    }

    #[test]
    fn test_partial_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [upstream]
            api_key = "ABC"

            [[cache.ttl]]
            path = "/IEconDOTA2_570/GetHeroes/v1/"
            ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.api_key, "ABC");
        assert_eq!(config.upstream.base_url, "http://api.steampowered.com");
        assert_eq!(
            config.cache.ttl,
            vec![TtlRule { path: "/IEconDOTA2_570/GetHeroes/v1/".into(), ttl_secs: 60 }]
        );
        assert!(config.cache.enabled);
    }
}
