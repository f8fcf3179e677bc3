//! Per-path cache lifetimes.

use std::collections::HashMap;

use crate::config::CacheConfig;

const DAY: u64 = 24 * 60 * 60;

/// Built-in lifetimes, keyed by outbound path.
const BUILTIN_TTLS: &[(&str, u64)] = &[
    ("/ISteamWebAPIUtil/GetSupportedAPIList/v1/", DAY),
    ("/IEconDOTA2_570/GetHeroes/v1/", 30 * DAY),
    ("/IEconDOTA2_570/GetGameItems/v1/", 30 * DAY),
    ("/IDOTA2Match_570/GetMatchDetails/v1/", DAY),
    ("/IDOTA2Match_570/GetMatchHistory/v1/", 5 * 60),
    ("/ISteamUser/GetPlayerSummaries/v2/", 10 * 60),
];

/// Maps an outbound path to the number of seconds its response stays cached.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    rules: HashMap<String, u64>,
    default_ttl: u64,
}

impl TtlPolicy {
    /// Built-in table with configured overrides layered on top.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut rules: HashMap<String, u64> = BUILTIN_TTLS
            .iter()
            .map(|(path, ttl)| (path.to_string(), *ttl))
            .collect();
        for rule in &config.ttl {
            rules.insert(rule.path.clone(), rule.ttl_secs);
        }
        Self {
            rules,
            default_ttl: config.default_ttl_secs,
        }
    }

    pub fn ttl_for(&self, path: &str) -> u64 {
        self.rules.get(path).copied().unwrap_or(self.default_ttl)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
