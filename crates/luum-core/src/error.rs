//! Error taxonomy shared by every Luum crate

use thiserror::Error;

/// Coarse classification of a [`CameraError`], preserved up to the API boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Port unresolvable or device unreachable while connecting
    Connection,
    /// Unknown setting or file
    NotFound,
    /// Value rejected by a setting's type, choices or range
    Validation,
    /// Any other driver or I/O failure talking to the camera
    Device,
    /// Failure on our side (re-encoding, archiving)
    Internal,
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to connect to camera at {port}: {reason}")]
    Connection { port: String, reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid value: {0}")]
    Validation(String),
    #[error("Camera error: {0}")]
    Device(String),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] image::ImageError),
    #[error("Failed to build archive: {0}")]
    Archive(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CameraError {
    pub fn connection(port: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            port: port.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Device(_) | Self::Io(_) => ErrorKind::Device,
            // The stored file is not an image the re-encoder can read
            Self::Imaging(image::ImageError::Decoding(_) | image::ImageError::Unsupported(_)) => {
                ErrorKind::Validation
            }
            Self::Imaging(_) | Self::Archive(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T, E = CameraError> = std::result::Result<T, E>;
