//! Bundling of a capture and its sibling files into a zip archive
//!
//! A single logical capture can leave several files on the card (for
//! example a RAW and its JPEG counterpart). They share the captured
//! file's base name and are collected and archived. They are removed
//! from the camera only after the archive is complete.

use std::io::{Cursor, Write};

use luum_core::files::file_stem;
use luum_core::{CameraDriver, CameraError, CameraFilePath, Result};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive built from one capture
#[derive(Debug, Clone)]
pub struct CapturePackage {
    /// Archive file name, `<base name>.zip`
    pub name: String,
    /// Serialized zip archive
    pub data: Vec<u8>,
    /// Names of the archived files, in archive order
    pub files: Vec<String>,
}

fn archive_error(e: impl std::fmt::Display) -> CameraError {
    CameraError::Archive(e.to_string())
}

/// Download and archive every file in the capture's folder that shares
/// its base name, then delete them. A failed download deletes nothing.
/// The caller must hold the session lock.
pub fn package_capture(
    driver: &mut dyn CameraDriver,
    captured: &CameraFilePath,
) -> Result<CapturePackage> {
    let stem = captured.stem();
    let siblings: Vec<String> = driver
        .folder_list_files(&captured.folder)?
        .into_iter()
        .filter(|name| file_stem(name) == stem)
        .collect();

    if siblings.is_empty() {
        return Err(CameraError::not_found(format!(
            "captured file {} is not on the card",
            captured
        )));
    }

    // Camera files are already compressed
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));

    for name in &siblings {
        let file = driver.file_get(&captured.folder, name)?;
        archive
            .start_file(name.as_str(), options)
            .map_err(archive_error)?;
        archive.write_all(&file.data).map_err(archive_error)?;
        debug!(folder = %captured.folder, file = %name, bytes = file.data.len(), "Archived");
    }

    let data = archive.finish().map_err(archive_error)?.into_inner();

    // Nothing leaves the card until the whole archive exists
    for name in &siblings {
        driver.file_delete(&captured.folder, name)?;
        debug!(folder = %captured.folder, file = %name, "Deleted from camera");
    }

    let name = format!("{}.zip", stem);

    info!(
        archive = %name,
        files = siblings.len(),
        bytes = data.len(),
        "Packaged capture"
    );

    Ok(CapturePackage {
        name,
        data,
        files: siblings,
    })
}
