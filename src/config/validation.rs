//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check upstream URL and paths are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ConfigIssue {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new("listener.bind_address", "not a socket address"));
    }
    if config.listener.request_timeout_secs == 0 {
        issues.push(ConfigIssue::new("listener.request_timeout_secs", "must be > 0"));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.cannot_be_a_base() => {
            issues.push(ConfigIssue::new("upstream.base_url", "cannot be used as a base URL"));
        }
        Ok(_) => {}
        Err(e) => issues.push(ConfigIssue::new("upstream.base_url", e.to_string())),
    }
    if config.upstream.request_timeout_secs == 0 {
        issues.push(ConfigIssue::new("upstream.request_timeout_secs", "must be > 0"));
    }
    for (field, path) in [
        ("upstream.probe_path", &config.upstream.probe_path),
        ("upstream.listing_path", &config.upstream.listing_path),
    ] {
        if !path.starts_with('/') {
            issues.push(ConfigIssue::new(field, "must start with '/'"));
        }
    }

    if !(100..=599).contains(&config.scheduler.busy_status) {
        issues.push(ConfigIssue::new("scheduler.busy_status", "not an HTTP status code"));
    }

    if config.cache.max_entries == 0 {
        issues.push(ConfigIssue::new("cache.max_entries", "must be > 0"));
    }
    for (i, rule) in config.cache.ttl.iter().enumerate() {
        if !rule.path.starts_with('/') {
            issues.push(ConfigIssue::new(format!("cache.ttl[{}].path", i), "must start with '/'"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        issues.push(ConfigIssue::new("observability.metrics_address", "not a socket address"));
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        issues.push(ConfigIssue::new("admin.api_key", "required when admin is enabled"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_issues() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.upstream.base_url = "not a url".into();
        config.upstream.listing_path = "ISteamWebAPIUtil".into();
        config.scheduler.busy_status = 42;
        config.cache.max_entries = 0;

        let issues = validate_config(&config).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "upstream.base_url",
                "upstream.listing_path",
                "scheduler.busy_status",
                "cache.max_entries",
            ]
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = ConfigIssue::new("cache.ttl[0].path", "must start with '/'");
        assert_eq!(issue.to_string(), "cache.ttl[0].path: must start with '/'");
    }
}
