//! Input dialog: a host-defined form.
//!
//! The dialog owns a `FormReconciler` for the lifetime of one invocation.
//! Closing waits for the form reset transition, clears the form, then
//! sends `inputData` with the submitted values (or no body when
//! cancelled).

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use overlay_bridge::SubscriptionSet;
use overlay_common::{Endpoint, FormError, HostEvent, OverlayError, UserAction};

use crate::component::{forward, Mounted};
use crate::context::{decode, OverlayContext};
use crate::form::{FormReconciler, FormRow};
use crate::state::{OverlayCell, OverlayKind, OverlayState};

const KIND: OverlayKind = OverlayKind::InputDialog;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDialogOptions {
    #[serde(default)]
    pub allow_cancel: Option<bool>,
    #[serde(default)]
    pub size: Option<String>,
}

/// `openDialog` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDialogProps {
    #[serde(default)]
    pub heading: String,
    pub rows: Vec<FormRow>,
    #[serde(default)]
    pub options: Option<InputDialogOptions>,
}

/// What the renderer shows: normalized rows and their current values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputDialogView {
    pub heading: String,
    pub options: InputDialogOptions,
    pub rows: Vec<FormRow>,
    pub values: Vec<Value>,
}

impl InputDialogView {
    /// Cancel and escape are enabled unless the host sent `allowCancel: false`.
    pub fn allow_cancel(&self) -> bool {
        self.options.allow_cancel != Some(false)
    }

    pub fn size(&self) -> &str {
        self.options.size.as_deref().unwrap_or("xs")
    }
}

type Reply = oneshot::Sender<Result<(), FormError>>;

enum InputCommand {
    Open(InputDialogProps),
    SetValue {
        index: usize,
        value: Value,
        reply: Reply,
    },
    Confirm(Option<Reply>),
    User(UserAction),
    HostClose,
}

/// Mounted input dialog.
pub struct InputDialog {
    inner: Mounted<InputCommand, InputDialogView>,
}

impl InputDialog {
    pub fn mount(ctx: &OverlayContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cell, state) = OverlayCell::new(KIND);

        let mut subscriptions = SubscriptionSet::new();
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::OpenDialog, &tx, |e| {
            decode(e).map(InputCommand::Open)
        });
        forward(&ctx.bus, &mut subscriptions, KIND, HostEvent::CloseInputDialog, &tx, |_| {
            Ok(InputCommand::HostClose)
        });

        let machine = InputMachine {
            ctx: ctx.clone(),
            cell,
            form: FormReconciler::new(),
        };
        let task = tokio::spawn(machine.run(rx));
        Self {
            inner: Mounted::new(KIND, tx, state, subscriptions, task),
        }
    }

    /// Store a user edit for row `index`.
    pub async fn set_value(&self, index: usize, value: Value) -> overlay_common::Result<()> {
        let (reply, rx) = oneshot::channel();
        self.inner.send(InputCommand::SetValue {
            index,
            value,
            reply,
        })?;
        self.await_reply(rx).await??;
        Ok(())
    }

    /// Submit the form. Fails with `FormError::RequiredMissing` (and the
    /// dialog stays open) when a required row is empty, and with
    /// `FormError::NotOpen` when no dialog is visible.
    pub async fn confirm(&self) -> overlay_common::Result<()> {
        let (reply, rx) = oneshot::channel();
        self.inner.send(InputCommand::Confirm(Some(reply)))?;
        self.await_reply(rx).await??;
        Ok(())
    }

    pub fn cancel(&self) -> overlay_common::Result<()> {
        self.inner.send(InputCommand::User(UserAction::Cancel))
    }

    pub fn user_action(&self, action: UserAction) -> overlay_common::Result<()> {
        match action {
            UserAction::Confirm => self.inner.send(InputCommand::Confirm(None)),
            other => self.inner.send(InputCommand::User(other)),
        }
    }

    pub fn state(&self) -> OverlayState<InputDialogView> {
        self.inner.state()
    }

    pub fn watch(&self) -> watch::Receiver<OverlayState<InputDialogView>> {
        self.inner.watch()
    }

    pub async fn unmount(self) {
        self.inner.unmount().await;
    }

    async fn await_reply(
        &self,
        rx: oneshot::Receiver<Result<(), FormError>>,
    ) -> Result<Result<(), FormError>, OverlayError> {
        rx.await.map_err(|_| OverlayError::Unmounted(KIND.as_str()))
    }
}

struct InputMachine {
    ctx: OverlayContext,
    cell: OverlayCell<InputDialogView>,
    form: FormReconciler,
}

impl InputMachine {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<InputCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
    }

    async fn handle(&mut self, command: InputCommand) {
        match command {
            InputCommand::Open(props) => {
                self.close(None).await;
                self.open(props);
            }
            InputCommand::SetValue {
                index,
                value,
                reply,
            } => {
                let result = self.set_value(index, value);
                let _ = reply.send(result);
            }
            InputCommand::Confirm(reply) => {
                let values = match self.submit() {
                    Ok(values) => values,
                    Err(e) => {
                        debug!(kind = %KIND, error = %e, "confirm refused");
                        if let Some(reply) = reply {
                            let _ = reply.send(Err(e));
                        }
                        return;
                    }
                };
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(()));
                }
                self.close(Some(values)).await;
            }
            InputCommand::User(action) => {
                if self.may_dismiss(action) {
                    self.close(None).await;
                } else {
                    debug!(kind = %KIND, action = action.label(), "action ignored");
                }
            }
            InputCommand::HostClose => self.close(None).await,
        }
    }

    fn open(&mut self, props: InputDialogProps) {
        self.form.load(props.rows, Utc::now().timestamp_millis());
        self.cell.open(InputDialogView {
            heading: props.heading,
            options: props.options.unwrap_or_default(),
            rows: self.form.rows().to_vec(),
            values: self.form.values(),
        });
    }

    fn set_value(&mut self, index: usize, value: Value) -> Result<(), FormError> {
        self.form.set_value(index, value)?;
        let values = self.form.values();
        self.cell.update(|view| view.values = values);
        Ok(())
    }

    /// Validated values to report.
    fn submit(&self) -> Result<Vec<Value>, FormError> {
        if !self.cell.is_visible() {
            return Err(FormError::NotOpen);
        }
        self.form.validate()?;
        let format = &self.ctx.config.dialogs.date_format;
        Ok(self.form.submit(&Local, format))
    }

    fn may_dismiss(&self, action: UserAction) -> bool {
        let Some(view) = self.cell.data() else {
            return false;
        };
        match action {
            UserAction::Cancel | UserAction::Escape => view.allow_cancel(),
            UserAction::ClickOutside => {
                self.ctx.config.dialogs.input_close_on_click_outside && view.allow_cancel()
            }
            _ => false,
        }
    }

    /// Close and report `values`, or a bare `inputData` when cancelled.
    async fn close(&mut self, values: Option<Vec<Value>>) {
        if !self.cell.begin_close() {
            return;
        }
        self.cell.finish_close(self.ctx.timings().form_reset()).await;
        self.form.clear();
        debug!(kind = %KIND, submitted = values.is_some(), "resolved");
        self.ctx
            .notify(Endpoint::InputData, values.map(Value::Array));
    }
}
