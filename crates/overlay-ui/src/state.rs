//! Visibility lifecycle shared by every overlay.
//!
//! `Closed -> Opening -> Visible -> Closing -> Closed`. The current state is
//! published on a `tokio::sync::watch` channel so the renderer (and tests)
//! can follow every frame.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// The overlay surfaces driven by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    Alert,
    InputDialog,
    ContextMenu,
    Progress,
    CircleProgress,
    TextUi,
}

impl OverlayKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayKind::Alert => "alert",
            OverlayKind::InputDialog => "input-dialog",
            OverlayKind::ContextMenu => "context-menu",
            OverlayKind::Progress => "progress",
            OverlayKind::CircleProgress => "circle-progress",
            OverlayKind::TextUi => "text-ui",
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Closed,
    Opening,
    Visible,
    Closing,
}

/// Snapshot of one overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayState<T> {
    pub phase: Phase,
    /// Whether the overlay is mounted on screen.
    pub visible: bool,
    pub data: Option<T>,
    /// Set while the exit transition plays.
    pub transition_pending: bool,
}

impl<T> OverlayState<T> {
    pub fn closed() -> Self {
        Self {
            phase: Phase::Closed,
            visible: false,
            data: None,
            transition_pending: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }
}

impl<T> Default for OverlayState<T> {
    fn default() -> Self {
        Self::closed()
    }
}

/// Owner side of an overlay's state channel. Only the overlay's own task
/// holds one, so transitions are never interleaved.
pub struct OverlayCell<T> {
    kind: OverlayKind,
    tx: watch::Sender<OverlayState<T>>,
}

impl<T: Clone> OverlayCell<T> {
    pub fn new(kind: OverlayKind) -> (Self, watch::Receiver<OverlayState<T>>) {
        let (tx, rx) = watch::channel(OverlayState::closed());
        (Self { kind, tx }, rx)
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.tx.borrow().phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase() == Phase::Visible
    }

    /// Clone of the current data, if any.
    pub fn data(&self) -> Option<T> {
        self.tx.borrow().data.clone()
    }

    /// `Closed -> Opening -> Visible` with `data`.
    ///
    /// Callers must have driven the overlay to `Closed` first.
    pub fn open(&self, data: T) {
        debug_assert!(self.tx.borrow().is_closed(), "{} opened while not closed", self.kind);
        self.tx.send_replace(OverlayState {
            phase: Phase::Opening,
            visible: true,
            data: Some(data),
            transition_pending: false,
        });
        debug!(kind = %self.kind, "opening");
        self.tx.send_modify(|s| s.phase = Phase::Visible);
        debug!(kind = %self.kind, "visible");
    }

    /// Mutate the data of a visible overlay. No-op otherwise.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_if_modified(|s| match (&s.phase, s.data.as_mut()) {
            (Phase::Visible, Some(data)) => {
                f(data);
                true
            }
            _ => false,
        });
    }

    /// `Visible -> Closing`. Returns `false` if the overlay was not visible.
    pub fn begin_close(&self) -> bool {
        let started = self.tx.send_if_modified(|s| {
            if s.phase != Phase::Visible {
                return false;
            }
            s.phase = Phase::Closing;
            s.visible = false;
            s.transition_pending = true;
            true
        });
        if started {
            debug!(kind = %self.kind, "closing");
        }
        started
    }

    /// Wait out the exit transition, then `Closing -> Closed`, returning the
    /// data the overlay showed.
    pub async fn finish_close(&self, exit: Duration) -> Option<T> {
        if self.phase() != Phase::Closing {
            return None;
        }
        tokio::time::sleep(exit).await;
        let previous = self.tx.send_replace(OverlayState::closed());
        debug!(kind = %self.kind, exit_ms = exit.as_millis() as u64, "closed");
        // Observers get to see the closed frame before a reopen replaces it.
        tokio::task::yield_now().await;
        previous.data
    }

    /// Handle for observers.
    pub fn subscribe(&self) -> watch::Receiver<OverlayState<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let (cell, rx) = OverlayCell::<String>::new(OverlayKind::TextUi);
        assert_eq!(cell.phase(), Phase::Closed);
        assert_eq!(*rx.borrow(), OverlayState::closed());
    }

    #[test]
    fn open_lands_on_visible_with_data() {
        let (cell, rx) = OverlayCell::new(OverlayKind::Alert);
        cell.open("hello".to_string());

        let state = rx.borrow();
        assert_eq!(state.phase, Phase::Visible);
        assert!(state.visible);
        assert_eq!(state.data.as_deref(), Some("hello"));
        assert!(!state.transition_pending);
    }

    #[test]
    fn update_only_applies_while_visible() {
        let (cell, _rx) = OverlayCell::new(OverlayKind::Progress);
        cell.update(|v: &mut u8| *v = 5);
        assert_eq!(cell.data(), None);

        cell.open(0u8);
        cell.update(|v| *v = 5);
        assert_eq!(cell.data(), Some(5));
    }

    #[test]
    fn begin_close_requires_visible() {
        let (cell, _rx) = OverlayCell::<u8>::new(OverlayKind::ContextMenu);
        assert!(!cell.begin_close());

        cell.open(1);
        assert!(cell.begin_close());
        assert!(!cell.begin_close());

        let state = cell.subscribe().borrow().clone();
        assert_eq!(state.phase, Phase::Closing);
        assert!(!state.visible);
        assert!(state.transition_pending);
        assert_eq!(state.data, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_close_waits_for_exit_transition() {
        let (cell, rx) = OverlayCell::new(OverlayKind::InputDialog);
        cell.open(7u8);
        cell.begin_close();

        let started = tokio::time::Instant::now();
        let data = cell.finish_close(Duration::from_millis(200)).await;
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(data, Some(7));
        assert_eq!(*rx.borrow(), OverlayState::closed());
    }

    #[tokio::test(start_paused = true)]
    async fn finish_close_without_begin_is_noop() {
        let (cell, _rx) = OverlayCell::new(OverlayKind::InputDialog);
        cell.open(7u8);
        assert_eq!(cell.finish_close(Duration::from_millis(200)).await, None);
        assert_eq!(cell.phase(), Phase::Visible);
    }

    #[test]
    fn kind_names() {
        assert_eq!(OverlayKind::CircleProgress.to_string(), "circle-progress");
        assert_eq!(OverlayKind::InputDialog.as_str(), "input-dialog");
    }
}
