//! Dialog and text UI configuration types.

use serde::{Deserialize, Serialize};

/// Dialog behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogsConfig {
    pub alert_close_on_click_outside: bool,
    pub input_close_on_click_outside: bool,
    /// day.js style pattern used when a date row asks for a string result.
    pub date_format: String,
}

impl Default for DialogsConfig {
    fn default() -> Self {
        Self {
            alert_close_on_click_outside: false,
            input_close_on_click_outside: false,
            date_format: "DD/MM/YYYY".to_string(),
        }
    }
}

/// Text UI placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextUiConfig {
    /// One of `right-center`, `left-center`, `top-center`, `bottom-center`.
    pub default_position: String,
}

impl Default for TextUiConfig {
    fn default() -> Self {
        Self {
            default_position: "right-center".to_string(),
        }
    }
}
