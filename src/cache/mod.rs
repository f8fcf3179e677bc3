//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! (path, params)
//!     → key.rs (sha-256 over path + sorted params, credential excluded)
//!     → layer.rs (prefix, lookup in store)
//!         hit  → cached body, status 200
//!         miss → fetch closure → store body on 200 with policy TTL
//! ```
//!
//! # Design Decisions
//! - The credential never reaches the key, so rotating keys keeps the cache warm
//! - Store outages degrade to uncached operation instead of failing calls
//! - Expiry is delegated to the store

pub mod key;
pub mod layer;
pub mod policy;
pub mod store;

pub use key::{compute_key, CacheKey, CREDENTIAL_PARAM};
pub use layer::{CacheLayer, CacheStats, CachedResponse};
pub use policy::TtlPolicy;
pub use store::{CacheStore, MemoryStore, StoreError};
