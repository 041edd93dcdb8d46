//! What every overlay needs from its surroundings.

use std::sync::{Arc, OnceLock};

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use overlay_bridge::{EventBus, SharedTransport};
use overlay_common::{Endpoint, InboundEvent, PayloadError};
use overlay_config::{OverlayConfig, TransitionConfig};

type Notification = (Endpoint, Option<Value>);

/// Bus, transport and configuration threaded through overlay construction.
#[derive(Clone)]
pub struct OverlayContext {
    pub bus: EventBus,
    pub transport: SharedTransport,
    pub config: Arc<OverlayConfig>,
    outbox: Arc<OnceLock<mpsc::UnboundedSender<Notification>>>,
}

impl OverlayContext {
    pub fn new(bus: EventBus, transport: SharedTransport, config: OverlayConfig) -> Self {
        Self {
            bus,
            transport,
            config: Arc::new(config),
            outbox: Arc::new(OnceLock::new()),
        }
    }

    pub fn timings(&self) -> &TransitionConfig {
        &self.config.transitions
    }

    /// Report to the host without holding up the caller.
    ///
    /// Notifications reach the transport in the order they were made.
    /// Transport failures are logged; the overlay has already closed.
    pub(crate) fn notify(&self, endpoint: Endpoint, body: Option<Value>) {
        let outbox = self.outbox.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(deliver(Arc::clone(&self.transport), rx));
            tx
        });
        if outbox.send((endpoint, body)).is_err() {
            warn!(%endpoint, "host outbox closed, notification dropped");
        }
    }
}

/// Start each queued call in queue order. Calls waiting on a response do
/// not hold up the ones behind them.
async fn deliver(transport: SharedTransport, mut queue: mpsc::UnboundedReceiver<Notification>) {
    let mut in_flight = FuturesUnordered::new();
    loop {
        tokio::select! {
            queued = queue.recv() => match queued {
                Some((endpoint, body)) => {
                    in_flight.push(send_one(Arc::clone(&transport), endpoint, body));
                }
                None => break,
            },
            Some(()) = in_flight.next(), if !in_flight.is_empty() => {}
        }
    }
    while in_flight.next().await.is_some() {}
}

async fn send_one(transport: SharedTransport, endpoint: Endpoint, body: Option<Value>) {
    match transport.send(endpoint.as_str(), body).await {
        Ok(_) => debug!(%endpoint, "host notified"),
        Err(e) => warn!(%endpoint, error = %e, "host notification failed"),
    }
}

/// Deserialize an event payload, failing closed on missing or mistyped fields.
pub(crate) fn decode<T: DeserializeOwned>(event: &InboundEvent) -> Result<T, PayloadError> {
    serde_json::from_value(event.payload.clone()).map_err(|e| PayloadError::Malformed {
        event: event.name.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::host_context;
    use overlay_bridge::StandaloneTransport;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Deserialize)]
    struct Payload {
        header: String,
    }

    #[test]
    fn decode_accepts_well_formed_payload() {
        let event = InboundEvent::new("sendAlert", json!({"header": "Hi", "extra": 1}));
        let payload: Payload = decode(&event).unwrap();
        assert_eq!(payload.header, "Hi");
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let event = InboundEvent::new("sendAlert", json!({"content": "no header"}));
        let err = decode::<Payload>(&event).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { ref event, .. } if event == "sendAlert"));
        assert!(err.to_string().contains("header"));
    }

    #[tokio::test]
    async fn notify_reaches_transport() {
        let transport = Arc::new(StandaloneTransport::new());
        let ctx = OverlayContext::new(EventBus::new(), transport.clone(), OverlayConfig::default());

        ctx.notify(Endpoint::CloseContext, None);
        while transport.sent().is_empty() {
            tokio::task::yield_now().await;
        }
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, "closeContext");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn notifications_reach_the_host_in_order() {
        let (ctx, mut host) = host_context();
        for i in 0..64 {
            ctx.notify(Endpoint::ClickContext, Some(json!(i.to_string())));
        }

        for i in 0..64 {
            let call = host.next_call().await.unwrap();
            assert_eq!(call.endpoint, "clickContext");
            assert_eq!(call.body, Some(json!(i.to_string())));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_call_does_not_hold_up_the_next() {
        let (ctx, mut host) = host_context();
        ctx.notify(Endpoint::CloseAlert, Some(json!("cancel")));
        ctx.notify(Endpoint::ProgressComplete, None);

        assert_eq!(host.next_call().await.unwrap().endpoint, "closeAlert");
        let started = tokio::time::Instant::now();
        assert_eq!(host.next_call().await.unwrap().endpoint, "progressComplete");
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
