//! Host-bound calls.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use overlay_common::{BridgeError, OutboundCall};

/// Sends calls to the host and resolves with the host's answer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Call `endpoint` with an optional body. `None` is a bare notification.
    async fn send(&self, endpoint: &str, body: Option<Value>) -> Result<Value, BridgeError>;
}

pub type SharedTransport = Arc<dyn Transport>;

/// Transport used when no host is attached.
///
/// Every call resolves to `null` so overlays behave the same as with a live
/// host. Calls are kept for inspection.
#[derive(Debug, Default)]
pub struct StandaloneTransport {
    sent: Mutex<Vec<OutboundCall>>,
}

impl StandaloneTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls seen so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundCall> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Calls seen so far for one endpoint.
    pub fn sent_to(&self, endpoint: &str) -> Vec<OutboundCall> {
        self.sent()
            .into_iter()
            .filter(|c| c.endpoint == endpoint)
            .collect()
    }
}

#[async_trait]
impl Transport for StandaloneTransport {
    async fn send(&self, endpoint: &str, body: Option<Value>) -> Result<Value, BridgeError> {
        let call = OutboundCall::new(endpoint, body);
        debug!(id = %call.id, endpoint, body = ?call.body, "standalone call resolved locally");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(call);
        }
        Ok(Value::Null)
    }
}
