//! Luum Sim - Simulated camera backend
//!
//! Provides a [`DriverFactory`] whose cameras live entirely in memory, so
//! the daemon can be run and exercised without attached hardware.

pub mod camera;
pub mod widgets;

use luum_core::{CameraDriver, DetectedCamera, DriverFactory, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use camera::SimulatedCamera;

/// One simulated camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedCameraConfig {
    /// Model name reported by autodetection
    pub name: String,
    /// Port identifier the camera answers on
    pub port: String,
}

impl Default for SimulatedCameraConfig {
    fn default() -> Self {
        Self {
            name: "Luum Simulated EOS".to_string(),
            port: "usb:001,002".to_string(),
        }
    }
}

/// Factory for simulated camera handles
pub struct SimulatedFactory {
    cameras: Vec<SimulatedCameraConfig>,
}

impl SimulatedFactory {
    pub fn new(cameras: Vec<SimulatedCameraConfig>) -> Self {
        Self { cameras }
    }
}

impl DriverFactory for SimulatedFactory {
    fn autodetect(&self) -> Result<Vec<DetectedCamera>> {
        Ok(self
            .cameras
            .iter()
            .map(|c| DetectedCamera {
                name: c.name.clone(),
                port: c.port.clone(),
            })
            .collect())
    }

    fn open(&self) -> Result<Box<dyn CameraDriver>> {
        debug!(cameras = self.cameras.len(), "Opening simulated driver handle");
        Ok(Box::new(SimulatedCamera::new(self.cameras.clone())))
    }
}
