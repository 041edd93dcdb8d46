//! Replay of recorded host events for running without a host.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use overlay_bridge::HostSender;
use overlay_common::{BridgeError, InboundEvent, OverlayError};

/// Read a JSON array of `{"action", "data"}` events.
pub fn load_script(path: &Path) -> Result<Vec<InboundEvent>, OverlayError> {
    let text = std::fs::read_to_string(path)?;
    let events: Vec<InboundEvent> = serde_json::from_str(&text).map_err(BridgeError::from)?;
    Ok(events)
}

/// Push `events` after `delay`, in order. Returns how many were delivered.
pub async fn replay(events: Vec<InboundEvent>, delay: Duration, sender: HostSender) -> usize {
    tokio::time::sleep(delay).await;
    let total = events.len();
    let mut delivered = 0;
    for event in events {
        if let Err(e) = sender.push(event) {
            warn!(error = %e, "script replay stopped");
            break;
        }
        delivered += 1;
    }
    info!(delivered, total, "script replayed");
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_bridge::HostChannel;
    use std::io::Write;

    #[test]
    fn loads_event_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"action": "sendAlert", "data": {{"header": "Hi", "content": "There"}}}},
                {{"action": "progressCancel"}}
            ]"#
        )
        .unwrap();

        let events = load_script(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "sendAlert");
        assert!(events[1].payload.is_null());
    }

    #[test]
    fn rejects_bad_scripts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"action": "sendAlert"}}"#).unwrap();
        assert!(matches!(
            load_script(file.path()),
            Err(OverlayError::Bridge(BridgeError::Codec(_)))
        ));

        let missing = Path::new("/definitely/not/here.json");
        assert!(matches!(load_script(missing), Err(OverlayError::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn replays_after_delay_in_order() {
        let (link, host) = HostChannel::open(Duration::from_secs(5));
        let mut inbound = link.receive().unwrap();
        let events = vec![
            InboundEvent::new("textUi", serde_json::json!({"text": "a"})),
            InboundEvent::new("textUiHide", serde_json::Value::Null),
        ];

        let started = tokio::time::Instant::now();
        let delivered = replay(events, Duration::from_millis(1000), host.sender()).await;
        assert_eq!(delivered, 2);
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(inbound.next().await.unwrap().name, "textUi");
        assert_eq!(inbound.next().await.unwrap().name, "textUiHide");
    }
}
