//! Wire types for the remote method listing.
//!
//! The listing method answers with
//! `{"apilist": {"interfaces": [{"name", "methods": [{"name", "version",
//! "httpmethod", "parameters": [{"name", "optional", ...}]}]}]}}`.
//! Only the fields the registry needs are modeled; everything else is ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::registry::SchemaError;

/// The `apilist` wrapper returned by the listing method.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingEnvelope {
    pub apilist: RawMethodListing,
}

/// Raw listing of interfaces and their methods.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMethodListing {
    pub interfaces: Vec<RawInterface>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInterface {
    pub name: String,
    pub methods: Vec<RawMethod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMethod {
    pub name: String,
    pub version: u32,
    pub httpmethod: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawParameter {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
}

impl RawMethod {
    /// Only read-style methods are exposed through the gateway.
    pub fn is_read(&self) -> bool {
        self.httpmethod.eq_ignore_ascii_case("GET")
    }
}

impl RawMethodListing {
    /// Decode a listing from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        serde_json::from_value(value).map_err(|e| SchemaError::MalformedListing(e.to_string()))
    }

    /// Decode the full response body of the listing method.
    pub fn from_body(body: &str) -> Result<Self, SchemaError> {
        serde_json::from_str::<ListingEnvelope>(body)
            .map(|envelope| envelope.apilist)
            .map_err(|e| SchemaError::MalformedListing(e.to_string()))
    }
}
