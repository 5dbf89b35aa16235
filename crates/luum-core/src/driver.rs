//! Interface to the low-level camera driver
//!
//! Drivers are blocking and allow a single in-flight call per handle.
//! Callers are expected to serialize access themselves; see the session
//! crate.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::files::{CameraFile, CameraFilePath, FileInfo};
use crate::widget::ConfigWidget;

/// A transport endpoint the driver knows how to reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    /// Human-readable transport name (e.g. "Universal Serial Bus")
    pub name: String,
    /// Port identifier (e.g. "usb:001,002")
    pub path: String,
}

/// A camera found by autodetection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCamera {
    /// Camera model name
    pub name: String,
    pub port: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Image,
    Movie,
    Sound,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Movie => write!(f, "movie"),
            Self::Sound => write!(f, "sound"),
        }
    }
}

/// One live connection to one camera
pub trait CameraDriver: Send {
    /// Enumerate the transport ports the driver can bind to
    fn list_ports(&mut self) -> Result<Vec<PortInfo>>;

    fn set_port(&mut self, port: &PortInfo) -> Result<()>;

    /// Open the session with the camera on the bound port
    fn init(&mut self) -> Result<()>;

    fn exit(&mut self) -> Result<()>;

    /// Fetch the whole configuration tree
    fn get_config(&mut self) -> Result<ConfigWidget>;

    /// Commit an edited configuration tree
    fn set_config(&mut self, config: &ConfigWidget) -> Result<()>;

    /// Fetch a single setting by machine name
    fn get_single_config(&mut self, name: &str) -> Result<ConfigWidget>;

    fn set_single_config(&mut self, name: &str, widget: &ConfigWidget) -> Result<()>;

    /// Trigger a capture and return where the result was stored
    fn capture(&mut self, kind: CaptureKind) -> Result<CameraFilePath>;

    /// Grab one live-view frame
    fn capture_preview(&mut self) -> Result<CameraFile>;

    fn folder_list_folders(&mut self, folder: &str) -> Result<Vec<String>>;

    fn folder_list_files(&mut self, folder: &str) -> Result<Vec<String>>;

    fn file_get_info(&mut self, folder: &str, name: &str) -> Result<FileInfo>;

    fn file_get(&mut self, folder: &str, name: &str) -> Result<CameraFile>;

    fn file_delete(&mut self, folder: &str, name: &str) -> Result<()>;

    /// Free-form description of the camera
    fn summary(&mut self) -> Result<String>;
}

/// Produces driver handles and detects attached cameras
pub trait DriverFactory: Send + Sync {
    fn autodetect(&self) -> Result<Vec<DetectedCamera>>;

    /// A fresh, unbound driver handle
    fn open(&self) -> Result<Box<dyn CameraDriver>>;
}
