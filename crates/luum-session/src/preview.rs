//! Live-view frames framed for a `multipart/x-mixed-replace` response

use std::sync::Arc;

use luum_core::Result;

use crate::session::CameraSession;

/// Multipart boundary separating frames
pub const PREVIEW_BOUNDARY: &str = "preview-frame";

/// Content type of a preview stream response
pub const PREVIEW_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=preview-frame";

/// Frame one image as a self-delimited multipart chunk
pub fn frame_chunk(mimetype: &str, data: &[u8]) -> Vec<u8> {
    let header = format!("--{}\r\nContent-Type: {}\r\n\r\n", PREVIEW_BOUNDARY, mimetype);
    let mut chunk = Vec::with_capacity(header.len() + data.len() + 2);
    chunk.extend_from_slice(header.as_bytes());
    chunk.extend_from_slice(data);
    chunk.extend_from_slice(b"\r\n");
    chunk
}

/// Endless iterator of framed live-view chunks.
///
/// Each `next` takes the session lock, grabs one frame and releases the
/// lock before re-encoding. It never returns `None`; the consumer ends
/// the stream by dropping the iterator.
pub struct PreviewFrames {
    session: Arc<CameraSession>,
    size: u32,
    quality: u8,
}

impl PreviewFrames {
    pub(crate) fn new(session: Arc<CameraSession>, size: u32, quality: u8) -> Self {
        Self {
            session,
            size,
            quality,
        }
    }
}

impl Iterator for PreviewFrames {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(
            self.session
                .preview_frame(self.size, self.quality)
                .map(|frame| frame_chunk(&frame.mimetype, &frame.data)),
        )
    }
}
