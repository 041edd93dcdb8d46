//! Stand-in for the renderer: logs every overlay frame.

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use overlay_ui::{OverlayKind, OverlayState, Overlays};

/// Follow every overlay until its state channel closes.
pub fn spawn_all(overlays: &Overlays) -> Vec<JoinHandle<()>> {
    vec![
        follow(OverlayKind::Alert, overlays.alert.watch()),
        follow(OverlayKind::InputDialog, overlays.input.watch()),
        follow(OverlayKind::ContextMenu, overlays.context.watch()),
        follow(overlays.progress.kind(), overlays.progress.watch()),
        follow(overlays.circle.kind(), overlays.circle.watch()),
        follow(OverlayKind::TextUi, overlays.text_ui.watch()),
    ]
}

fn follow<T>(kind: OverlayKind, mut state: watch::Receiver<OverlayState<T>>) -> JoinHandle<()>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut phase = state.borrow().phase;
        while state.changed().await.is_ok() {
            let frame = state.borrow_and_update().clone();
            if frame.phase != phase {
                info!(%kind, from = ?phase, to = ?frame.phase, "overlay phase");
                phase = frame.phase;
            }
            match serde_json::to_string(&frame) {
                Ok(json) => debug!(%kind, frame = %json, "frame"),
                Err(e) => debug!(%kind, error = %e, "frame not serializable"),
            }
        }
    })
}
