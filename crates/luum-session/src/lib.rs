//! Luum Session - Safe shared access to cameras
//!
//! The underlying driver permits one call at a time and makes connecting
//! expensive. This crate wraps each camera in a [`CameraSession`] that
//! serializes access and tracks connection state, and keeps one session
//! per port in a [`SessionRegistry`].

pub mod hierarchy;
pub mod package;
pub mod preview;
pub mod registry;
pub mod session;

#[cfg(test)]
pub mod mock;

pub use package::CapturePackage;
pub use preview::{frame_chunk, PreviewFrames, PREVIEW_BOUNDARY, PREVIEW_CONTENT_TYPE};
pub use registry::{CameraListing, SessionRegistry};
pub use session::{CameraSession, SessionOptions, CAPTURE_TARGET_SETTING};
