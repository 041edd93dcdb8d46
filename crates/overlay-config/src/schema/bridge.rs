//! Host bridge configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Host channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Run without a live host; outbound calls resolve to `null`.
    pub standalone: bool,
    /// Safety timeout for outbound calls (valid range: 100-60000).
    pub call_timeout_ms: u64,
    /// Resource name reported in logs.
    pub resource: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            standalone: false,
            call_timeout_ms: 5000,
            resource: "overlay".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}
