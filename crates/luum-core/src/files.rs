//! Files stored on the camera

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CameraError, Result};

/// Location of a file on the camera's storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraFilePath {
    pub folder: String,
    pub name: String,
}

impl CameraFilePath {
    pub fn new(folder: &str, name: &str) -> Self {
        Self {
            folder: folder.to_string(),
            name: name.to_string(),
        }
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        file_stem(&self.name)
    }

    /// Split an absolute camera path into folder and file name
    pub fn parse(path: &str) -> Result<Self> {
        let (folder, name) = match path.rsplit_once('/') {
            Some((folder, name)) => (if folder.is_empty() { "/" } else { folder }, name),
            None => ("/", path),
        };
        if name.is_empty() {
            return Err(CameraError::not_found(format!("no file name in '{}'", path)));
        }
        Ok(Self::new(folder, name))
    }

    pub fn full_path(&self) -> String {
        join_folder(&self.folder, &self.name)
    }
}

impl std::fmt::Display for CameraFilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

/// File name without its extension ("IMG_0001.JPG" -> "IMG_0001")
pub fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Join a camera folder and a child name with exactly one separator
pub fn join_folder(folder: &str, name: &str) -> String {
    if folder.ends_with('/') {
        format!("{}{}", folder, name)
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Contents of a file fetched from the camera
#[derive(Debug, Clone)]
pub struct CameraFile {
    pub mimetype: String,
    pub data: Vec<u8>,
}

/// Metadata reported for a stored file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub size: u64,
    /// Modification time, Unix seconds
    pub mtime: i64,
    pub permissions: u8,
    pub mimetype: String,
    /// Pixel dimensions (zero for non-images)
    pub width: u32,
    pub height: u32,
}

/// Node of the camera's storage hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileEntry {
    Folder {
        name: String,
        children: Vec<FileEntry>,
    },
    File {
        name: String,
        #[serde(flatten)]
        info: FileInfo,
    },
}

impl FileEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name, .. } => name,
        }
    }
}
