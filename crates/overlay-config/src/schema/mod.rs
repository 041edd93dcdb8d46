//! Configuration schema types for the overlay.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod bridge;
mod dialogs;
mod system;
mod transitions;

pub use bridge::*;
pub use dialogs::*;
pub use system::*;
pub use transitions::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct OverlayConfig {
    pub bridge: BridgeConfig,
    pub transitions: TransitionConfig,
    pub dialogs: DialogsConfig,
    pub text_ui: TextUiConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
