//! Application state management

use luum_core::{CameraError, DriverFactory};
use luum_session::{CameraListing, CameraSession, SessionRegistry};
use luum_sim::SimulatedFactory;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

/// Failure of a camera call made on behalf of a request
#[derive(Error, Debug)]
pub enum CallError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("Camera worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Shared application state
pub struct AppState {
    /// One session per camera port
    pub registry: Arc<SessionRegistry>,
    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Create new application state backed by the simulated cameras
    pub fn new(config: Config) -> Arc<Self> {
        let factory = Arc::new(SimulatedFactory::new(config.simulator.cameras.clone()));
        info!(
            cameras = config.simulator.cameras.len(),
            "Using simulated camera backend"
        );
        Self::with_factory(config, factory)
    }

    /// Create application state on top of an arbitrary driver factory
    pub fn with_factory(config: Config, factory: Arc<dyn DriverFactory>) -> Arc<Self> {
        let registry = Arc::new(SessionRegistry::new(factory, config.session_options()));
        Arc::new(Self { registry, config })
    }

    /// Run `op` against the session for `port` on the blocking pool.
    ///
    /// Driver calls block, sometimes for seconds, so they never run on the
    /// async executor.
    pub async fn with_session<T, F>(&self, port: &str, op: F) -> Result<T, CallError>
    where
        F: FnOnce(&CameraSession) -> luum_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let registry = self.registry.clone();
        let port = port.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let session = registry.get_or_create(&port)?;
            op(&session)
        })
        .await?;
        Ok(result?)
    }

    /// Look up (or connect) the session for `port` without running anything on it
    pub async fn session(&self, port: &str) -> Result<Arc<CameraSession>, CallError> {
        let registry = self.registry.clone();
        let port = port.to_string();
        let session = tokio::task::spawn_blocking(move || registry.get_or_create(&port)).await?;
        Ok(session?)
    }

    /// Autodetect cameras and describe each one
    pub async fn list_cameras(&self) -> Result<Vec<CameraListing>, CallError> {
        let registry = self.registry.clone();
        let cameras = tokio::task::spawn_blocking(move || registry.list_cameras()).await?;
        Ok(cameras?)
    }
}
