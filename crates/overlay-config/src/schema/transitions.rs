//! Transition timing configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed durations the overlays wait out before a close is complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Alert dialog exit transition (valid range: 0-5000).
    pub dialog_exit_ms: u64,
    /// Input dialog exit transition and form reset (valid range: 0-5000).
    pub form_reset_ms: u64,
    /// Gap between closing one context menu and showing the next (valid range: 0-5000).
    pub context_reopen_ms: u64,
    /// Scale-fade exit used by progress bars and text UI (valid range: 0-5000).
    pub fade_exit_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            dialog_exit_ms: 150,
            form_reset_ms: 200,
            context_reopen_ms: 100,
            fade_exit_ms: 200,
        }
    }
}

impl TransitionConfig {
    pub fn dialog_exit(&self) -> Duration {
        Duration::from_millis(self.dialog_exit_ms)
    }

    pub fn form_reset(&self) -> Duration {
        Duration::from_millis(self.form_reset_ms)
    }

    pub fn context_reopen(&self) -> Duration {
        Duration::from_millis(self.context_reopen_ms)
    }

    pub fn fade_exit(&self) -> Duration {
        Duration::from_millis(self.fade_exit_ms)
    }
}
