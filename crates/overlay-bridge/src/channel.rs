//! In-process host channel with call correlation.
//!
//! `HostChannel::open` returns both ends of the channel:
//! - `HostLink` is the overlay side: a `Transport` for host-bound calls and
//!   the inbound event stream.
//! - `HostEnd` is the host side: it pushes events, takes outbound calls, and
//!   answers them by correlation id.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::Stream;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use overlay_common::{BridgeError, CorrelationId, InboundEvent, OutboundCall};

use crate::codec::{HostFrame, HostResponse};
use crate::transport::{SharedTransport, Transport};

struct PendingCall {
    endpoint: String,
    reply: oneshot::Sender<Result<Value, BridgeError>>,
}

type PendingMap = Arc<Mutex<HashMap<CorrelationId, PendingCall>>>;

pub struct HostChannel;

impl HostChannel {
    /// Open a channel whose calls fail with `BridgeError::Timeout` when the
    /// host does not answer within `call_timeout`.
    pub fn open(call_timeout: Duration) -> (HostLink, HostEnd) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (call_tx, call_rx) = mpsc::unbounded_channel();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let transport = Arc::new(ChannelTransport {
            calls: call_tx,
            pending: Arc::clone(&pending),
            timeout: call_timeout,
        });

        let link = HostLink {
            transport,
            inbound: Mutex::new(Some(event_rx)),
        };
        let end = HostEnd {
            sender: HostSender {
                events: event_tx,
                pending,
            },
            calls: call_rx,
        };
        (link, end)
    }
}

// =============================================================================
// OVERLAY SIDE
// =============================================================================

/// Overlay side of a host channel.
pub struct HostLink {
    transport: Arc<ChannelTransport>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<InboundEvent>>>,
}

impl HostLink {
    pub fn transport(&self) -> SharedTransport {
        self.transport.clone()
    }

    /// Take the inbound event stream. It can be taken only once.
    pub fn receive(&self) -> Result<InboundStream, BridgeError> {
        let mut slot = self
            .inbound
            .lock()
            .map_err(|_| BridgeError::Transport("inbound slot poisoned".into()))?;
        slot.take()
            .map(|rx| InboundStream { rx })
            .ok_or(BridgeError::StreamTaken)
    }
}

/// Host events in emission order. Ends when the host side is dropped.
pub struct InboundStream {
    rx: mpsc::UnboundedReceiver<InboundEvent>,
}

impl InboundStream {
    pub async fn next(&mut self) -> Option<InboundEvent> {
        self.rx.recv().await
    }
}

impl Stream for InboundStream {
    type Item = InboundEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// `Transport` that hands calls to the host end and awaits the
/// correlated response.
pub struct ChannelTransport {
    calls: mpsc::UnboundedSender<OutboundCall>,
    pending: PendingMap,
    timeout: Duration,
}

impl ChannelTransport {
    fn forget(&self, id: &CorrelationId) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(id);
        }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, endpoint: &str, body: Option<Value>) -> Result<Value, BridgeError> {
        let call = OutboundCall::new(endpoint, body);
        let id = call.id.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| BridgeError::Transport("pending map poisoned".into()))?;
            pending.insert(
                id.clone(),
                PendingCall {
                    endpoint: endpoint.to_string(),
                    reply: reply_tx,
                },
            );
        }

        debug!(id = %id, endpoint, "outbound call");
        if self.calls.send(call).is_err() {
            self.forget(&id);
            return Err(BridgeError::Disconnected);
        }

        match tokio::time::timeout(self.timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BridgeError::Disconnected),
            Err(_) => {
                self.forget(&id);
                Err(BridgeError::Timeout {
                    endpoint: endpoint.to_string(),
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

// =============================================================================
// HOST SIDE
// =============================================================================

/// Cloneable half of the host end: pushes events and answers calls.
#[derive(Clone)]
pub struct HostSender {
    events: mpsc::UnboundedSender<InboundEvent>,
    pending: PendingMap,
}

impl HostSender {
    /// Push an event to the overlay.
    pub fn push(&self, event: InboundEvent) -> Result<(), BridgeError> {
        self.events
            .send(event)
            .map_err(|_| BridgeError::Disconnected)
    }

    /// Answer an outstanding call. Returns `false` for an unknown id.
    pub fn respond(&self, response: HostResponse) -> bool {
        let entry = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(&response.id));

        match entry {
            Some(call) => {
                let result = response.into_result(&call.endpoint);
                // The caller may have given up already.
                let _ = call.reply.send(result);
                true
            }
            None => {
                warn!(id = %response.id, "response for unknown call dropped");
                false
            }
        }
    }

    /// Route a parsed host frame.
    pub fn feed(&self, frame: HostFrame) -> Result<(), BridgeError> {
        match frame {
            HostFrame::Event(event) => self.push(event),
            HostFrame::Response(response) => {
                self.respond(response);
                Ok(())
            }
        }
    }

    /// Number of calls still awaiting a response.
    pub fn pending_calls(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

/// Host side of a host channel.
pub struct HostEnd {
    sender: HostSender,
    calls: mpsc::UnboundedReceiver<OutboundCall>,
}

impl HostEnd {
    pub fn sender(&self) -> HostSender {
        self.sender.clone()
    }

    pub fn push(&self, event: InboundEvent) -> Result<(), BridgeError> {
        self.sender.push(event)
    }

    pub fn respond(&self, response: HostResponse) -> bool {
        self.sender.respond(response)
    }

    /// Wait for the next outbound call.
    pub async fn next_call(&mut self) -> Option<OutboundCall> {
        self.calls.recv().await
    }
}

impl Drop for HostEnd {
    fn drop(&mut self) {
        // Wake every waiting caller with `Disconnected`.
        if let Ok(mut pending) = self.sender.pending.lock() {
            pending.clear();
        }
    }
}
