//! JSON-lines host channel over stdin/stdout.
//!
//! Each stdin line is a host frame: an event `{"action", "data"}` or a
//! response `{"id", "ok", "data", "error"}`. Each outbound call is written
//! to stdout as one `{"id", "endpoint", "body"}` line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use overlay_bridge::codec::encode_call;
use overlay_bridge::{HostEnd, HostFrame, HostSender};

/// Feed host lines into the channel until `reader` ends. Returns the
/// number of frames accepted.
pub async fn pump_host_lines<R>(reader: R, sender: &HostSender) -> u64
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut accepted = 0u64;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read host input");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let frame = match HostFrame::from_json(line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "unrecognised host line dropped");
                continue;
            }
        };
        if let Err(e) = sender.feed(frame) {
            warn!(error = %e, "host channel closed");
            break;
        }
        accepted += 1;
    }
    info!(accepted, "host input ended");
    accepted
}

/// Write outbound calls to `writer` until the overlay side goes away.
pub async fn pump_calls<W>(host: &mut HostEnd, mut writer: W) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(call) = host.next_call().await {
        let line = match encode_call(&call) {
            Ok(line) => line,
            Err(e) => {
                warn!(endpoint = %call.endpoint, error = %e, "failed to encode call");
                continue;
            }
        };
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        debug!(id = %call.id, endpoint = %call.endpoint, "call written");
        written += 1;
    }
    Ok(written)
}
