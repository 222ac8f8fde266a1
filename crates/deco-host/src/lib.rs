//! Deco host — durable storage behind the canvas and the details panel.
//!
//! The editor extension spawns `deco-host` and speaks newline-delimited
//! JSON over stdio: one `Request` per input line, zero or more `Reply`
//! lines back. Logs go to stderr.

pub mod error;
pub mod handler;
pub mod listing;
pub mod writer;

pub use error::{HostError, HostResult};
pub use handler::Handler;
pub use writer::{Storage, StoreWriter};

use deco_core::protocol::{Reply, Request};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Run the request loop until `input` closes.
///
/// Requests are handled one at a time in arrival order. A line that
/// doesn't parse gets an error notification and the loop carries on.
pub async fn serve<R, W>(input: R, mut output: W, handler: &Handler) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let replies = match serde_json::from_str::<Request>(line) {
            Ok(request) => handler.handle(request).await,
            Err(e) => {
                log::warn!("malformed request: {e}");
                vec![Reply::error(format!("Malformed request: {e}"))]
            }
        };

        for reply in replies {
            let mut json = serde_json::to_string(&reply)?;
            json.push('\n');
            output.write_all(json.as_bytes()).await?;
        }
        output.flush().await?;
    }
    Ok(())
}
