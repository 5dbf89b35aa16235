//! Luum Core - Core types, configuration flattening, and driver interface
//!
//! This crate provides the foundational pieces shared by the Luum crates:
//! - The camera configuration widget tree and value validation
//! - Flattening of that tree into addressable setting descriptors
//! - The storage hierarchy model
//! - The blocking driver interface implemented by camera backends
//! - Image re-encoding for thumbnails and previews

pub mod driver;
pub mod error;
pub mod files;
pub mod flatten;
pub mod imaging;
pub mod widget;

pub use driver::{CameraDriver, CaptureKind, DetectedCamera, DriverFactory, PortInfo};
pub use error::{CameraError, ErrorKind, Result};
pub use files::{CameraFile, CameraFilePath, FileEntry, FileInfo};
pub use flatten::{flatten_config, ConfigDescriptor};
pub use widget::{ConfigWidget, WidgetRange, WidgetType, WidgetValue};
