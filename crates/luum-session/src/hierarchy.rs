//! Recursive listing of the camera's storage

use luum_core::files::join_folder;
use luum_core::{CameraDriver, FileEntry, Result};

/// Walk the whole storage tree starting at `/`.
///
/// Within each folder, subfolders (expanded recursively) come first,
/// then files, each in the order the driver reports them.
pub fn file_hierarchy(driver: &mut dyn CameraDriver) -> Result<FileEntry> {
    Ok(FileEntry::Folder {
        name: "/".to_string(),
        children: list_children(driver, "/")?,
    })
}

fn list_children(driver: &mut dyn CameraDriver, folder: &str) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for name in driver.folder_list_folders(folder)? {
        let children = list_children(driver, &join_folder(folder, &name))?;
        entries.push(FileEntry::Folder { name, children });
    }

    for name in driver.folder_list_files(folder)? {
        let info = driver.file_get_info(folder, &name)?;
        entries.push(FileEntry::File { name, info });
    }

    Ok(entries)
}
