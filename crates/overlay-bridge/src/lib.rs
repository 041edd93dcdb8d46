//! Host bridge for the overlay.
//!
//! Provides:
//! - A `Transport` seam for host-bound calls, with a correlated channel
//!   implementation and a standalone (no host) implementation
//! - The inbound event stream fed by the host's push channel
//! - An `EventBus` dispatching inbound events to named handlers
//! - The JSON wire codec spoken on the host channel

pub mod bus;
pub mod channel;
pub mod codec;
pub mod dispatch;
pub mod transport;

pub use bus::{EventBus, Handler, Subscription, SubscriptionSet};
pub use channel::{ChannelTransport, HostChannel, HostEnd, HostLink, HostSender, InboundStream};
pub use codec::{HostFrame, HostResponse};
pub use dispatch::run_dispatch_loop;
pub use transport::{SharedTransport, StandaloneTransport, Transport};
