//! Gateway readiness states.

use serde::Serialize;

/// Where the gateway is in its setup sequence.
///
/// `Uninitialized` → (configure ok) → `ConfiguredNoSchema` → (load_schema ok) → `Ready`.
/// A failed step never moves the gateway backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayState {
    Uninitialized,
    ConfiguredNoSchema,
    Ready,
}

impl GatewayState {
    pub(crate) fn derive(has_key: bool, has_schema: bool) -> Self {
        match (has_key, has_schema) {
            (true, true) => GatewayState::Ready,
            (true, false) => GatewayState::ConfiguredNoSchema,
            (false, _) => GatewayState::Uninitialized,
        }
    }

    pub fn is_ready(self) -> bool {
        self == GatewayState::Ready
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GatewayState::Uninitialized => "uninitialized",
            GatewayState::ConfiguredNoSchema => "configured_no_schema",
            GatewayState::Ready => "ready",
        }
    }
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
