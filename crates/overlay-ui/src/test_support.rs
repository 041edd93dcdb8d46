//! Helpers shared by the overlay tests.

use std::time::Duration;

use serde_json::Value;

use overlay_bridge::{EventBus, HostChannel, HostEnd};
use overlay_common::{HostEvent, InboundEvent};
use overlay_config::OverlayConfig;

use crate::context::OverlayContext;

/// Context wired to an in-process host with default config.
pub(crate) fn host_context() -> (OverlayContext, HostEnd) {
    host_context_with(OverlayConfig::default())
}

pub(crate) fn host_context_with(config: OverlayConfig) -> (OverlayContext, HostEnd) {
    let (link, host) = HostChannel::open(Duration::from_secs(30));
    let ctx = OverlayContext::new(EventBus::new(), link.transport(), config);
    (ctx, host)
}

pub(crate) fn host_event(event: HostEvent, payload: Value) -> InboundEvent {
    InboundEvent::new(event.as_str(), payload)
}

/// `true` if the overlay sends nothing to the host within `window`.
pub(crate) async fn no_call_within(host: &mut HostEnd, window: Duration) -> bool {
    tokio::time::timeout(window, host.next_call()).await.is_err()
}
