//! Registry of camera sessions keyed by port

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use luum_core::{DriverFactory, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::session::{CameraSession, SessionOptions};

/// A detected camera and its summary
#[derive(Debug, Clone, Serialize)]
pub struct CameraListing {
    pub name: String,
    pub port: String,
    pub summary: String,
}

/// Process-lifetime map from port to session.
///
/// Sessions are created on first use and never removed. The map has its
/// own lock, independent of the per-session locks, so two callers racing
/// on an unseen port still end up sharing one session.
pub struct SessionRegistry {
    factory: Arc<dyn DriverFactory>,
    options: SessionOptions,
    sessions: Mutex<HashMap<String, Arc<CameraSession>>>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn DriverFactory>, options: SessionOptions) -> Self {
        Self {
            factory,
            options,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session for `port`, creating it if needed, and make sure
    /// it is connected. Connecting an already connected session does not
    /// touch the driver.
    pub fn get_or_create(&self, port: &str) -> Result<Arc<CameraSession>> {
        let session = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(port) {
                Some(session) => Arc::clone(session),
                None => {
                    let driver = self.factory.open()?;
                    let session =
                        Arc::new(CameraSession::new(port, driver, self.options.clone()));
                    sessions.insert(port.to_string(), Arc::clone(&session));
                    debug!(port = %port, "Created camera session");
                    session
                }
            }
        };

        session.connect()?;
        Ok(session)
    }

    #[cfg(test)]
    fn get(&self, port: &str) -> Option<Arc<CameraSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(port)
            .cloned()
    }

    #[cfg(test)]
    fn ports(&self) -> Vec<String> {
        let mut ports: Vec<String> = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ports.sort();
        ports
    }

    /// Detect attached cameras and describe each one
    pub fn list_cameras(&self) -> Result<Vec<CameraListing>> {
        let detected = self.factory.autodetect()?;
        info!(count = detected.len(), "Detected cameras");

        detected
            .into_iter()
            .map(|camera| {
                let summary = self.get_or_create(&camera.port)?.get_summary()?;
                Ok(CameraListing {
                    name: camera.name,
                    port: camera.port,
                    summary,
                })
            })
            .collect()
    }
}
