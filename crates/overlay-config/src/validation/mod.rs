//! Full configuration validation.
//!
//! Validates numeric ranges and enumerated strings, collecting every
//! problem into a single `ConfigError`.

mod helpers;


use crate::schema::OverlayConfig;
use helpers::{validate_one_of, validate_range_u64};
use overlay_common::ConfigError;

/// Text UI positions the renderer understands.
pub const TEXT_UI_POSITIONS: &[&str] = &["right-center", "left-center", "top-center", "bottom-center"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &OverlayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range_u64(
        &mut errors,
        "bridge.call_timeout_ms",
        config.bridge.call_timeout_ms,
        100,
        60_000,
    );

    let t = &config.transitions;
    validate_range_u64(&mut errors, "transitions.dialog_exit_ms", t.dialog_exit_ms, 0, 5000);
    validate_range_u64(&mut errors, "transitions.form_reset_ms", t.form_reset_ms, 0, 5000);
    validate_range_u64(
        &mut errors,
        "transitions.context_reopen_ms",
        t.context_reopen_ms,
        0,
        5000,
    );
    validate_range_u64(&mut errors, "transitions.fade_exit_ms", t.fade_exit_ms, 0, 5000);

    if config.dialogs.date_format.trim().is_empty() {
        errors.push("dialogs.date_format must not be empty".to_string());
    }

    validate_one_of(
        &mut errors,
        "text_ui.default_position",
        &config.text_ui.default_position,
        TEXT_UI_POSITIONS,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
