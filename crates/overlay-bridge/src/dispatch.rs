//! The single consumer of the inbound stream.

use tracing::{debug, info};

use crate::bus::EventBus;
use crate::channel::InboundStream;

/// Feed every inbound event to the bus, in arrival order, until the host
/// side of the channel closes. Names outside the host event catalogue are
/// logged and dropped. Returns the number of events consumed.
pub async fn run_dispatch_loop(bus: EventBus, mut inbound: InboundStream) -> u64 {
    let mut dispatched = 0u64;
    while let Some(event) = inbound.next().await {
        dispatched += 1;
        let Some(known) = event.host_event() else {
            debug!(event = %event.name, "unknown event ignored");
            continue;
        };
        let handled = bus.dispatch(&event);
        debug!(event = %known, handled, "inbound event dispatched");
    }
    info!(dispatched, "inbound stream closed, dispatch loop stopped");
    dispatched
}
