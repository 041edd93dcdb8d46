pub mod actions;
pub mod errors;
pub mod events;
pub mod id;

pub use actions::UserAction;
pub use errors::{BridgeError, ConfigError, FormError, OverlayError, PayloadError};
pub use events::{Endpoint, HostEvent, InboundEvent, OutboundCall};
pub use id::{new_correlation_id, CorrelationId};

pub type Result<T> = std::result::Result<T, OverlayError>;
