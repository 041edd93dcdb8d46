//! Mounting an overlay: an owned task, a command queue, and bus subscriptions.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use overlay_bridge::{EventBus, SubscriptionSet};
use overlay_common::{HostEvent, InboundEvent, OverlayError, PayloadError};

use crate::state::{OverlayKind, OverlayState};

/// A mounted overlay. Commands are processed one at a time by the overlay's
/// task, so transitions of one overlay never overlap.
pub(crate) struct Mounted<C, T> {
    kind: OverlayKind,
    commands: mpsc::UnboundedSender<C>,
    state: watch::Receiver<OverlayState<T>>,
    subscriptions: SubscriptionSet,
    task: JoinHandle<()>,
}

impl<C: Send + 'static, T: Clone> Mounted<C, T> {
    pub(crate) fn new(
        kind: OverlayKind,
        commands: mpsc::UnboundedSender<C>,
        state: watch::Receiver<OverlayState<T>>,
        subscriptions: SubscriptionSet,
        task: JoinHandle<()>,
    ) -> Self {
        info!(%kind, handlers = subscriptions.len(), "overlay mounted");
        Self {
            kind,
            commands,
            state,
            subscriptions,
            task,
        }
    }

    pub(crate) fn send(&self, command: C) -> Result<(), OverlayError> {
        self.commands
            .send(command)
            .map_err(|_| OverlayError::Unmounted(self.kind.as_str()))
    }

    pub(crate) fn state(&self) -> OverlayState<T> {
        self.state.borrow().clone()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<OverlayState<T>> {
        self.state.clone()
    }

    /// Cancel the subscriptions, let queued commands (and any running
    /// close) finish, then stop the task.
    pub(crate) async fn unmount(self) {
        let Mounted {
            kind,
            commands,
            mut subscriptions,
            task,
            ..
        } = self;
        subscriptions.clear();
        drop(commands);
        if let Err(e) = task.await {
            debug!(%kind, error = %e, "overlay task ended abnormally");
        }
        info!(%kind, "overlay unmounted");
    }
}

/// Forward `event` from the bus into an overlay's command queue.
///
/// A payload that `make` rejects is reported to the bus as a handler
/// failure and nothing reaches the overlay.
pub(crate) fn forward<C, F>(
    bus: &EventBus,
    subscriptions: &mut SubscriptionSet,
    kind: OverlayKind,
    event: HostEvent,
    commands: &mpsc::UnboundedSender<C>,
    make: F,
) where
    C: Send + 'static,
    F: Fn(&InboundEvent) -> Result<C, PayloadError> + Send + Sync + 'static,
{
    let commands = commands.clone();
    subscriptions.push(bus.on(event.as_str(), move |inbound| {
        let command = make(inbound)?;
        commands
            .send(command)
            .map_err(|_| OverlayError::Unmounted(kind.as_str()))
    }));
}
