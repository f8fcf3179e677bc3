//! Cache key derivation.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Query parameter carrying the API credential. Never part of a cache key.
pub const CREDENTIAL_PARAM: &str = "key";

/// Fixed-length digest identifying a request in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the cache key of a request.
///
/// Parameters are hashed in name order with the credential left out, so the
/// key depends on neither parameter order nor the API key in use. The
/// caller's map is only borrowed.
pub fn compute_key<'a>(
    path: &str,
    params: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> CacheKey {
    let sorted: BTreeMap<&str, &str> = params
        .into_iter()
        .filter(|(name, _)| name.as_str() != CREDENTIAL_PARAM)
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    let mut hasher = Sha256::new();
    update_field(&mut hasher, path);
    for (name, value) in sorted {
        update_field(&mut hasher, name);
        update_field(&mut hasher, value);
    }

    CacheKey(hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect())
}

/// Length-prefixed so that ("ab", "c") and ("a", "bc") hash differently.
fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn map(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn key_of(path: &str, pairs: &[(&str, &str)]) -> CacheKey {
        let params: HashMap<String, String> = map(pairs).into_iter().collect();
        compute_key(path, &params)
    }

    #[test]
    fn test_credential_and_order_do_not_matter() {
        let a = key_of("/I/M/v1/", &[("a", "1"), ("b", "2"), ("key", "X")]);
        let b = key_of("/I/M/v1/", &[("b", "2"), ("a", "1"), ("key", "Y")]);
        let c = key_of("/I/M/v1/", &[("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_fixed_length_hex() {
        let key = key_of("/I/M/v1/", &[("a", "1")]);
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinguishes_semantic_inputs() {
        let base = key_of("/I/M/v1/", &[("a", "1")]);
        assert_ne!(base, key_of("/I/M/v2/", &[("a", "1")]));
        assert_ne!(base, key_of("/I/M/v1/", &[("a", "2")]));
        assert_ne!(base, key_of("/I/M/v1/", &[("a", "1"), ("b", "")]));
        assert_ne!(key_of("/p", &[("ab", "c")]), key_of("/p", &[("a", "bc")]));
    }

    #[test]
    fn test_caller_map_untouched() {
        let params: BTreeMap<String, String> = map(&[("a", "1"), ("key", "SECRET")]).into_iter().collect();
        let _ = compute_key("/I/M/v1/", &params);
        assert_eq!(params.get("key").map(String::as_str), Some("SECRET"));
    }
}
