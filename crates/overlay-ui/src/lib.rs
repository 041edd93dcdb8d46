//! Overlay state machines and the input dialog form model.
//!
//! Each overlay is mounted on an `EventBus`, owns one task that applies its
//! commands in order, and publishes its `OverlayState` on a watch channel
//! for the renderer.

pub mod alert;
mod component;
pub mod context;
pub mod context_menu;
pub mod form;
pub mod input_dialog;
pub mod overlays;
pub mod progress;
pub mod state;
pub mod text_ui;

#[cfg(test)]
mod test_support;

pub use alert::{AlertDialog, AlertLabels, AlertProps, AlertResolution};
pub use context::OverlayContext;
pub use context_menu::{ContextMenu, ContextMenuProps, ContextOption, ContextOptions};
pub use form::{FieldEntry, FormReconciler, FormRow};
pub use input_dialog::{InputDialog, InputDialogOptions, InputDialogProps, InputDialogView};
pub use overlays::Overlays;
pub use progress::{ProgressBar, ProgressPosition, ProgressProps, ProgressView};
pub use state::{OverlayKind, OverlayState, Phase};
pub use text_ui::{TextUi, TextUiPosition, TextUiProps};
