//! Live-view streaming bridge
//!
//! Frames are produced by a blocking loop on the blocking pool and handed to
//! the response body through a channel holding a single chunk, so a slow
//! client throttles the camera instead of buffering frames. Once the client
//! goes away the body is dropped, the next send fails and the loop exits,
//! which releases its hold on the session.

use axum::body::Body;
use luum_session::PreviewFrames;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Turn a preview iterator into a streaming response body
pub fn preview_body(frames: PreviewFrames, port: String) -> Body {
    let (tx, rx) = mpsc::channel::<Vec<u8>>(1);

    tokio::task::spawn_blocking(move || {
        let mut sent = 0u64;
        for frame in frames {
            match frame {
                Ok(chunk) => {
                    if tx.blocking_send(chunk).is_err() {
                        debug!(port = %port, frames = sent, "Preview client disconnected");
                        return;
                    }
                    sent += 1;
                }
                Err(e) => {
                    warn!(port = %port, frames = sent, error = %e, "Preview stream ended");
                    return;
                }
            }
        }
    });

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok::<_, Infallible>(chunk), rx))
    });

    Body::from_stream(stream)
}
