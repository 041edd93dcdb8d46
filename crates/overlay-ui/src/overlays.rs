//! Every overlay, mounted on one bus.

use tracing::info;

use crate::alert::AlertDialog;
use crate::context::OverlayContext;
use crate::context_menu::ContextMenu;
use crate::input_dialog::InputDialog;
use crate::progress::ProgressBar;
use crate::text_ui::TextUi;

pub struct Overlays {
    pub alert: AlertDialog,
    pub input: InputDialog,
    pub context: ContextMenu,
    pub progress: ProgressBar,
    pub circle: ProgressBar,
    pub text_ui: TextUi,
}

impl Overlays {
    pub fn mount(ctx: &OverlayContext) -> Self {
        let overlays = Self {
            alert: AlertDialog::mount(ctx),
            input: InputDialog::mount(ctx),
            context: ContextMenu::mount(ctx),
            progress: ProgressBar::mount_linear(ctx),
            circle: ProgressBar::mount_circle(ctx),
            text_ui: TextUi::mount(ctx),
        };
        info!(resource = %ctx.config.bridge.resource, "overlays mounted");
        overlays
    }

    /// Unsubscribe everything and wait for each overlay task to stop.
    pub async fn unmount(self) {
        self.alert.unmount().await;
        self.input.unmount().await;
        self.context.unmount().await;
        self.progress.unmount().await;
        self.circle.unmount().await;
        self.text_ui.unmount().await;
        info!("overlays unmounted");
    }
}
