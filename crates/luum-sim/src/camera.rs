//! In-memory camera driver
//!
//! Mimics the behaviour Luum has to cope with on real hardware: the
//! handle must be bound and initialised before use, captures land either
//! on the memory card or in internal RAM depending on `capturetarget`,
//! and a capture after live view fails until the camera is re-initialised.

use std::collections::BTreeMap;

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use luum_core::files::join_folder;
use luum_core::{
    CameraDriver, CameraError, CameraFile, CameraFilePath, CaptureKind, ConfigWidget, FileInfo,
    PortInfo, Result, WidgetValue,
};
use tracing::{debug, trace};

use crate::SimulatedCameraConfig;
use crate::widgets::{default_config, CAPTURE_TARGETS, IMAGE_FORMATS};

const CARD_FOLDER: &str = "/store_00010001/DCIM/100LUUM";
const RAM_FOLDER: &str = "/";
const CAPTURE_SIZE: (u32, u32) = (1600, 1200);
const PREVIEW_SIZE: (u32, u32) = (640, 480);

struct StoredFile {
    file: CameraFile,
    info: FileInfo,
}

/// A simulated camera; it takes the identity of whichever configured
/// camera's port it is bound to
pub struct SimulatedCamera {
    model: String,
    cameras: Vec<SimulatedCameraConfig>,
    ports: Vec<PortInfo>,
    bound: Option<PortInfo>,
    initialised: bool,
    live_view: bool,
    config: ConfigWidget,
    folders: BTreeMap<String, Vec<String>>,
    files: BTreeMap<String, StoredFile>,
    captures: u32,
    frames: u32,
}

impl SimulatedCamera {
    pub fn new(cameras: Vec<SimulatedCameraConfig>) -> Self {
        let ports = cameras
            .iter()
            .map(|c| PortInfo {
                name: "Universal Serial Bus".to_string(),
                path: c.port.clone(),
            })
            .collect();
        let model = cameras
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| SimulatedCameraConfig::default().name);

        let mut folders = BTreeMap::new();
        folders.insert("/".to_string(), vec!["store_00010001".to_string()]);
        folders.insert("/store_00010001".to_string(), vec!["DCIM".to_string()]);
        folders.insert("/store_00010001/DCIM".to_string(), vec!["100LUUM".to_string()]);

        Self {
            config: default_config(&model, "00000001"),
            model,
            cameras,
            ports,
            bound: None,
            initialised: false,
            live_view: false,
            folders,
            files: BTreeMap::new(),
            captures: 0,
            frames: 0,
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(CameraError::device("camera not initialised"))
        }
    }

    fn setting(&self, name: &str) -> Option<&str> {
        match self.config.find_child(name)?.value.as_ref()? {
            WidgetValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn store(&mut self, folder: &str, name: &str, file: CameraFile, dims: (u32, u32)) {
        let info = FileInfo {
            size: file.data.len() as u64,
            mtime: Utc::now().timestamp(),
            permissions: 3,
            mimetype: file.mimetype.clone(),
            width: dims.0,
            height: dims.1,
        };
        self.files
            .insert(join_folder(folder, name), StoredFile { file, info });
    }

    fn lookup(&self, folder: &str, name: &str) -> Result<&StoredFile> {
        self.files
            .get(&join_folder(folder, name))
            .ok_or_else(|| CameraError::not_found(join_folder(folder, name)))
    }
}

/// Render a test-card style image and encode it as JPEG
fn render_jpeg(width: u32, height: u32, phase: u32) -> Result<Vec<u8>> {
    let (w, h) = (width.max(1), height.max(1));
    let shift = phase.wrapping_mul(7) % w;
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (((x + shift) % w) * 255 / w) as u8,
            (y * 255 / h) as u8,
            (phase.wrapping_mul(31) % 256) as u8,
        ])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img).write_with_encoder(JpegEncoder::new_with_quality(&mut out, 85))?;
    Ok(out)
}

impl CameraDriver for SimulatedCamera {
    fn list_ports(&mut self) -> Result<Vec<PortInfo>> {
        Ok(self.ports.clone())
    }

    fn set_port(&mut self, port: &PortInfo) -> Result<()> {
        let camera = self
            .cameras
            .iter()
            .find(|c| c.port == port.path)
            .ok_or_else(|| CameraError::connection(&port.path, "no camera on port"))?;
        self.model = camera.name.clone();
        if let Some(widget) = self.config.find_child_mut("cameramodel") {
            widget.value = Some(WidgetValue::Text(self.model.clone()));
        }
        self.bound = Some(port.clone());
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        let port = self
            .bound
            .as_ref()
            .ok_or_else(|| CameraError::device("no port bound"))?;
        debug!(port = %port.path, model = %self.model, "Simulated camera initialised");
        self.initialised = true;
        self.live_view = false;
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        self.initialised = false;
        self.live_view = false;
        Ok(())
    }

    fn get_config(&mut self) -> Result<ConfigWidget> {
        self.ensure_ready()?;
        Ok(self.config.clone())
    }

    fn set_config(&mut self, config: &ConfigWidget) -> Result<()> {
        self.ensure_ready()?;
        self.config = config.clone();
        clear_changed(&mut self.config);
        Ok(())
    }

    fn get_single_config(&mut self, name: &str) -> Result<ConfigWidget> {
        self.ensure_ready()?;
        self.config
            .find_child(name)
            .cloned()
            .ok_or_else(|| CameraError::not_found(format!("setting '{}'", name)))
    }

    fn set_single_config(&mut self, name: &str, widget: &ConfigWidget) -> Result<()> {
        self.ensure_ready()?;
        let mut committed = widget.clone();
        clear_changed(&mut committed);
        if self.config.replace(&committed) {
            Ok(())
        } else {
            Err(CameraError::not_found(format!("setting '{}'", name)))
        }
    }

    fn capture(&mut self, kind: CaptureKind) -> Result<CameraFilePath> {
        self.ensure_ready()?;
        if self.live_view {
            return Err(CameraError::device("I/O in progress"));
        }
        if kind != CaptureKind::Image {
            return Err(CameraError::device(format!("{} capture not supported", kind)));
        }

        self.captures += 1;
        let to_card = self.setting("capturetarget") == Some(CAPTURE_TARGETS[1]);
        let (folder, stem) = if to_card {
            (CARD_FOLDER, format!("IMG_{:04}", self.captures))
        } else {
            (RAM_FOLDER, format!("capt{:04}", self.captures))
        };

        let jpeg = render_jpeg(CAPTURE_SIZE.0, CAPTURE_SIZE.1, self.captures)?;
        let name = format!("{}.JPG", stem);
        self.store(
            folder,
            &name,
            CameraFile {
                mimetype: "image/jpeg".to_string(),
                data: jpeg,
            },
            CAPTURE_SIZE,
        );

        if self.setting("imageformat") == Some(IMAGE_FORMATS[2]) {
            let raw = format!("LUUMRAW {} {}x{}", stem, CAPTURE_SIZE.0, CAPTURE_SIZE.1).into_bytes();
            self.store(
                folder,
                &format!("{}.CR2", stem),
                CameraFile {
                    mimetype: "image/x-canon-cr2".to_string(),
                    data: raw,
                },
                CAPTURE_SIZE,
            );
        }

        debug!(folder = %folder, name = %name, "Simulated capture");
        Ok(CameraFilePath::new(folder, &name))
    }

    fn capture_preview(&mut self) -> Result<CameraFile> {
        self.ensure_ready()?;
        self.live_view = true;
        self.frames = self.frames.wrapping_add(1);
        trace!(frame = self.frames, "Simulated preview frame");
        Ok(CameraFile {
            mimetype: "image/jpeg".to_string(),
            data: render_jpeg(PREVIEW_SIZE.0, PREVIEW_SIZE.1, self.frames)?,
        })
    }

    fn folder_list_folders(&mut self, folder: &str) -> Result<Vec<String>> {
        self.ensure_ready()?;
        Ok(self.folders.get(folder).cloned().unwrap_or_default())
    }

    fn folder_list_files(&mut self, folder: &str) -> Result<Vec<String>> {
        self.ensure_ready()?;
        let prefix = join_folder(folder, "");
        Ok(self
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }

    fn file_get_info(&mut self, folder: &str, name: &str) -> Result<FileInfo> {
        self.ensure_ready()?;
        Ok(self.lookup(folder, name)?.info.clone())
    }

    fn file_get(&mut self, folder: &str, name: &str) -> Result<CameraFile> {
        self.ensure_ready()?;
        Ok(self.lookup(folder, name)?.file.clone())
    }

    fn file_delete(&mut self, folder: &str, name: &str) -> Result<()> {
        self.ensure_ready()?;
        self.files
            .remove(&join_folder(folder, name))
            .map(|_| ())
            .ok_or_else(|| CameraError::not_found(join_folder(folder, name)))
    }

    fn summary(&mut self) -> Result<String> {
        self.ensure_ready()?;
        let port = self.bound.as_ref().map(|p| p.path.as_str()).unwrap_or("none");
        Ok(format!(
            "Camera summary:\nManufacturer: Luum\nModel: {}\n  Version: simulated\n  Serial Number: 00000001\nPort: {}\nCaptures taken: {}\nFiles on card: {}\n",
            self.model,
            port,
            self.captures,
            self.files.len()
        ))
    }
}

fn clear_changed(widget: &mut ConfigWidget) {
    widget.changed = false;
    for child in widget.children.iter_mut() {
        clear_changed(child);
    }
}
