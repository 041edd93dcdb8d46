//! Alert dialog: a markdown message with confirm and optional cancel.
//!
//! Every open/close cycle reports exactly one `closeAlert` to the host,
//! after the exit transition has finished.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use overlay_bridge::SubscriptionSet;
use overlay_common::{Endpoint, HostEvent, UserAction};

use crate::component::{forward, Mounted};
use crate::context::{decode, OverlayContext};
use crate::state::{OverlayCell, OverlayKind, OverlayState};

const KIND: OverlayKind = OverlayKind::Alert;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertLabels {
    #[serde(default)]
    pub cancel: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
}

/// `sendAlert` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProps {
    pub header: String,
    pub content: String,
    #[serde(default)]
    pub centered: bool,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub overflow: bool,
    /// Show a cancel button.
    #[serde(default)]
    pub cancel: bool,
    #[serde(default)]
    pub labels: Option<AlertLabels>,
}

impl AlertProps {
    pub fn cancel_label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.labels
            .as_ref()
            .and_then(|l| l.cancel.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
    }

    pub fn confirm_label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.labels
            .as_ref()
            .and_then(|l| l.confirm.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
    }

    pub fn size_or_default(&self) -> &str {
        self.size.as_deref().unwrap_or("md")
    }
}

/// What the host is told when the alert closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertResolution {
    Confirm,
    Cancel,
}

impl AlertResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertResolution::Confirm => "confirm",
            AlertResolution::Cancel => "cancel",
        }
    }
}

enum AlertCommand {
    Show(AlertProps),
    User(UserAction),
    HostClose,
}

/// Mounted alert dialog.
pub struct AlertDialog {
    inner: Mounted<AlertCommand, AlertProps>,
}

impl AlertDialog {
    /// Subscribe to `sendAlert` / `closeAlertDialog` and start the dialog task.
    pub fn mount(ctx: &OverlayContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cell, state) = OverlayCell::new(KIND);

        let mut subscriptions = SubscriptionSet::new();
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::SendAlert, &tx, |e| {
            decode(e).map(AlertCommand::Show)
        });
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::CloseAlertDialog, &tx, |_| {
            Ok(AlertCommand::HostClose)
        });

        let machine = AlertMachine {
            ctx: ctx.clone(),
            cell,
        };
        let task = tokio::spawn(machine.run(rx));
        Self {
            inner: Mounted::new(KIND, tx, state, subscriptions, task),
        }
    }

    pub fn confirm(&self) -> overlay_common::Result<()> {
        self.inner.send(AlertCommand::User(UserAction::Confirm))
    }

    /// Cancel button. Ignored when the alert has no cancel button.
    pub fn cancel(&self) -> overlay_common::Result<()> {
        self.inner.send(AlertCommand::User(UserAction::Cancel))
    }

    /// Escape, click outside, or any other user action.
    pub fn user_action(&self, action: UserAction) -> overlay_common::Result<()> {
        self.inner.send(AlertCommand::User(action))
    }

    pub fn state(&self) -> OverlayState<AlertProps> {
        self.inner.state()
    }

    pub fn watch(&self) -> watch::Receiver<OverlayState<AlertProps>> {
        self.inner.watch()
    }

    pub async fn unmount(self) {
        self.inner.unmount().await;
    }
}

struct AlertMachine {
    ctx: OverlayContext,
    cell: OverlayCell<AlertProps>,
}

impl AlertMachine {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<AlertCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
    }

    async fn handle(&mut self, command: AlertCommand) {
        match command {
            AlertCommand::Show(props) => {
                // A new alert replaces the one on screen; the old one is
                // reported as cancelled once it is gone.
                self.close(AlertResolution::Cancel).await;
                self.cell.open(props);
            }
            AlertCommand::HostClose => self.close(AlertResolution::Cancel).await,
            AlertCommand::User(action) => match self.resolve(action) {
                Some(resolution) => self.close(resolution).await,
                None => debug!(kind = %KIND, action = action.label(), "action ignored"),
            },
        }
    }

    fn resolve(&self, action: UserAction) -> Option<AlertResolution> {
        let props = self.cell.data()?;
        match action {
            UserAction::Confirm => Some(AlertResolution::Confirm),
            UserAction::Cancel if props.cancel => Some(AlertResolution::Cancel),
            UserAction::Escape => Some(AlertResolution::Cancel),
            UserAction::ClickOutside if self.ctx.config.dialogs.alert_close_on_click_outside => {
                Some(AlertResolution::Cancel)
            }
            _ => None,
        }
    }

    async fn close(&mut self, resolution: AlertResolution) {
        if !self.cell.begin_close() {
            return;
        }
        self.cell
            .finish_close(self.ctx.timings().dialog_exit())
            .await;
        debug!(kind = %KIND, resolution = resolution.as_str(), "resolved");
        self.ctx
            .notify(Endpoint::CloseAlert, Some(json!(resolution.as_str())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use crate::test_support::{host_context, host_event, no_call_within};
    use serde_json::Value;
    use std::time::Duration;

    fn alert_payload(cancel: bool) -> Value {
        json!({"header": "Warning", "content": "Proceed?", "cancel": cancel})
    }

    #[test]
    fn labels_fall_back() {
        let props: AlertProps = serde_json::from_value(json!({
            "header": "h",
            "content": "c",
            "labels": {"confirm": "Yes", "cancel": ""}
        }))
        .unwrap();
        assert_eq!(props.confirm_label("Confirm"), "Yes");
        assert_eq!(props.cancel_label("Cancel"), "Cancel");
        assert_eq!(props.size_or_default(), "md");
        assert!(!props.cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_reports_confirm_after_exit_transition() {
        let (ctx, mut host) = host_context();
        let alert = AlertDialog::mount(&ctx);
        let mut state = alert.watch();

        ctx.bus.dispatch(&host_event(HostEvent::SendAlert, alert_payload(false)));
        state.wait_for(|s| s.phase == Phase::Visible).await.unwrap();
        assert_eq!(alert.state().data.unwrap().header, "Warning");

        let started = tokio::time::Instant::now();
        alert.confirm().unwrap();
        let call = host.next_call().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(150));
        assert_eq!(call.endpoint, "closeAlert");
        assert_eq!(call.body, Some(json!("confirm")));
        assert!(alert.state().is_closed());

        alert.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_button_requires_cancel_flag() {
        let (ctx, mut host) = host_context();
        let alert = AlertDialog::mount(&ctx);
        let mut state = alert.watch();

        ctx.bus.dispatch(&host_event(HostEvent::SendAlert, alert_payload(false)));
        state.wait_for(|s| s.phase == Phase::Visible).await.unwrap();

        alert.cancel().unwrap();
        assert!(no_call_within(&mut host, Duration::from_secs(1)).await);
        assert_eq!(alert.state().phase, Phase::Visible);

        alert.user_action(UserAction::Escape).unwrap();
        assert_eq!(host.next_call().await.unwrap().body, Some(json!("cancel")));
    }

    #[tokio::test(start_paused = true)]
    async fn click_outside_is_ignored_by_default() {
        let (ctx, mut host) = host_context();
        let alert = AlertDialog::mount(&ctx);
        let mut state = alert.watch();

        ctx.bus.dispatch(&host_event(HostEvent::SendAlert, alert_payload(true)));
        state.wait_for(|s| s.phase == Phase::Visible).await.unwrap();

        alert.user_action(UserAction::ClickOutside).unwrap();
        assert!(no_call_within(&mut host, Duration::from_secs(1)).await);
        assert!(alert.state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn host_close_reports_cancel_once() {
        let (ctx, mut host) = host_context();
        let alert = AlertDialog::mount(&ctx);
        let mut state = alert.watch();

        ctx.bus.dispatch(&host_event(HostEvent::SendAlert, alert_payload(true)));
        state.wait_for(|s| s.phase == Phase::Visible).await.unwrap();

        ctx.bus.dispatch(&host_event(HostEvent::CloseAlertDialog, Value::Null));
        ctx.bus.dispatch(&host_event(HostEvent::CloseAlertDialog, Value::Null));
        alert.confirm().unwrap();

        assert_eq!(host.next_call().await.unwrap().body, Some(json!("cancel")));
        assert!(no_call_within(&mut host, Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_payload_keeps_alert_closed() {
        let (ctx, mut host) = host_context();
        let alert = AlertDialog::mount(&ctx);

        let handled = ctx
            .bus
            .dispatch(&host_event(HostEvent::SendAlert, json!({"content": "no header"})));
        assert_eq!(handled, 0);
        assert!(no_call_within(&mut host, Duration::from_secs(1)).await);
        assert!(alert.state().is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_removes_handlers() {
        let (ctx, _host) = host_context();
        let alert = AlertDialog::mount(&ctx);
        assert_eq!(ctx.bus.handler_count("sendAlert"), 1);
        assert_eq!(ctx.bus.handler_count("closeAlertDialog"), 1);

        alert.unmount().await;
        assert_eq!(ctx.bus.handler_count("sendAlert"), 0);
        assert_eq!(ctx.bus.handler_count("closeAlertDialog"), 0);
    }
}
