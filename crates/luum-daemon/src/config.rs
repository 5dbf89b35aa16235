//! Configuration loading

use anyhow::Result;
use luum_session::SessionOptions;
use luum_sim::SimulatedCameraConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tls: None,
        }
    }
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM format)
    pub cert: String,
    /// Path to private key file (PEM format)
    pub key: String,
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Value forced into the `capturetarget` setting before every capture
    #[serde(default = "default_capture_target")]
    pub capture_target: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            capture_target: default_capture_target(),
        }
    }
}

fn default_capture_target() -> String {
    SessionOptions::default().capture_target
}

/// Defaults applied when a preview request leaves size or quality out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Bounding box for preview frames in pixels (0 = camera size)
    #[serde(default)]
    pub default_size: u32,
    /// JPEG quality for re-encoded frames (0 = encoder default)
    #[serde(default)]
    pub default_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Cameras presented by the simulated backend
    #[serde(default = "default_simulated_cameras")]
    pub cameras: Vec<SimulatedCameraConfig>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            cameras: default_simulated_cameras(),
        }
    }
}

fn default_simulated_cameras() -> Vec<SimulatedCameraConfig> {
    vec![SimulatedCameraConfig::default()]
}

impl Config {
    /// Options handed to every camera session
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            capture_target: self.camera.capture_target.clone(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
