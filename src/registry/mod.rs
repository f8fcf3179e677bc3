//! Method registry subsystem.
//!
//! # Data Flow
//! ```text
//! listing response body
//!     → listing.rs (decode into raw interface/method/parameter records)
//!     → MethodRegistry::load (drop non-GET methods, build snapshot)
//!     → atomic swap of Arc<Snapshot>
//!     → gateway calls observe the new schema
//! ```
//!
//! # Design Decisions
//! - Snapshot is immutable once published; a reload builds a new one
//! - Readers never see a partially built snapshot
//! - Validation is permissive: unknown parameters are accepted
//! - Versions are keyed by integer, so "v0002" and "2" address the same method

pub mod listing;
pub mod version;

use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::observability::metrics;

pub use crate::error::{SchemaError, ValidationError};
pub use listing::RawMethodListing;
pub use version::{normalize_version, VersionError};

/// One remote method the gateway may call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition {
    pub interface: String,
    pub method: String,
    pub version: u32,
    /// Parameter name -> optional flag.
    pub parameters: BTreeMap<String, bool>,
}

impl MethodDefinition {
    /// Names of parameters the caller must supply, in name order.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|(_, optional)| !**optional)
            .map(|(name, _)| name.as_str())
    }
}

type VersionTable = HashMap<u32, MethodDefinition>;

/// Fully built interface → method → version table.
#[derive(Debug, Default)]
struct Snapshot {
    interfaces: HashMap<String, HashMap<String, VersionTable>>,
    method_count: usize,
}

impl Snapshot {
    fn build(listing: RawMethodListing) -> Self {
        let mut interfaces: HashMap<String, HashMap<String, VersionTable>> = HashMap::new();

        for interface in listing.interfaces {
            let methods = interfaces.entry(interface.name.clone()).or_default();
            for method in interface.methods.into_iter().filter(|m| m.is_read()) {
                let parameters = method
                    .parameters
                    .into_iter()
                    .map(|p| (p.name, p.optional))
                    .collect();
                let definition = MethodDefinition {
                    interface: interface.name.clone(),
                    method: method.name.clone(),
                    version: method.version,
                    parameters,
                };
                methods
                    .entry(method.name)
                    .or_default()
                    .insert(method.version, definition);
            }
        }

        let method_count = interfaces
            .values()
            .flat_map(|methods| methods.values())
            .map(|versions| versions.len())
            .sum();

        Self {
            interfaces,
            method_count,
        }
    }

    fn get(&self, interface: &str, method: &str, version: &str) -> Option<&MethodDefinition> {
        let version: u32 = version.parse().ok()?;
        self.interfaces.get(interface)?.get(method)?.get(&version)
    }
}

/// Holds the learned schema and answers existence/validation queries.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    snapshot: ArcSwapOption<Snapshot>,
}

impl MethodRegistry {
    /// Create an empty, not-ready registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole schema from a JSON listing (`{"interfaces": [...]}`).
    ///
    /// On error the previous snapshot stays in place.
    pub fn load(&self, listing: Value) -> Result<(), SchemaError> {
        let listing = RawMethodListing::from_value(listing)?;
        self.load_listing(listing);
        Ok(())
    }

    /// Replace the whole schema from an already decoded listing.
    pub fn load_listing(&self, listing: RawMethodListing) {
        let snapshot = Snapshot::build(listing);
        tracing::info!(
            interfaces = snapshot.interfaces.len(),
            methods = snapshot.method_count,
            "Method registry loaded"
        );
        metrics::record_registry_size(snapshot.method_count);
        self.snapshot.store(Some(Arc::new(snapshot)));
    }

    /// True once a listing has been loaded.
    pub fn is_ready(&self) -> bool {
        self.snapshot.load().is_some()
    }

    /// Number of (interface, method, version) triples in the current snapshot.
    pub fn method_count(&self) -> usize {
        self.snapshot
            .load_full()
            .map(|s| s.method_count)
            .unwrap_or(0)
    }

    /// Whether the triple exists. `version` must already be normalized.
    pub fn exists(&self, interface: &str, method: &str, version: &str) -> bool {
        self.snapshot
            .load_full()
            .is_some_and(|s| s.get(interface, method, version).is_some())
    }

    /// Check that every required parameter of the method is provided.
    pub fn validate<'a>(
        &self,
        interface: &str,
        method: &str,
        version: &str,
        provided: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ValidationError> {
        let snapshot = self.snapshot.load_full();
        let definition = snapshot
            .as_deref()
            .and_then(|s| s.get(interface, method, version))
            .ok_or_else(|| ValidationError::UnknownMethod {
                interface: interface.to_string(),
                method: method.to_string(),
                version: version.to_string(),
            })?;

        let provided: HashSet<&str> = provided.into_iter().collect();
        let missing = definition
            .required()
            .find(|name| !provided.contains(name))
            .map(str::to_string);
        match missing {
            Some(name) => Err(ValidationError::MissingParameter(name)),
            None => Ok(()),
        }
    }
}
