use serde::{Deserialize, Serialize};

/// User input an overlay can receive from the rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Confirm,
    Cancel,
    Escape,
    ClickOutside,
    CloseButton,
    Back,
}

impl UserAction {
    /// Human-readable label for logs and debug output.
    pub fn label(&self) -> &'static str {
        match self {
            UserAction::Confirm => "Confirm",
            UserAction::Cancel => "Cancel",
            UserAction::Escape => "Escape",
            UserAction::ClickOutside => "Click Outside",
            UserAction::CloseButton => "Close Button",
            UserAction::Back => "Back",
        }
    }
}
