//! Recording driver used by the session tests

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};
use luum_core::{
    CameraDriver, CameraError, CameraFile, CameraFilePath, CaptureKind, ConfigWidget,
    DetectedCamera, DriverFactory, FileInfo, PortInfo, Result, WidgetType,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListPorts,
    SetPort(String),
    Init,
    Exit,
    GetConfig,
    SetConfig,
    GetSingle(String),
    SetSingle(String),
    Capture,
    Preview,
    ListFolders(String),
    ListFiles(String),
    FileInfo(String),
    FileGet(String),
    FileDelete(String),
    Summary,
}

pub struct MockState {
    pub calls: Vec<Call>,
    pub ports: Vec<PortInfo>,
    pub config: ConfigWidget,
    pub folders: BTreeMap<String, Vec<String>>,
    pub files: BTreeMap<(String, String), CameraFile>,
    pub next_capture: CameraFilePath,
    pub fail_init: bool,
    pub fail_exit: bool,
    /// File whose download fails with an I/O error
    pub fail_get: Option<String>,
    /// Set when two calls were ever inside the driver at the same time
    pub overlaps: usize,
}

impl MockState {
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn add_file(&mut self, folder: &str, name: &str, mimetype: &str, data: Vec<u8>) {
        self.files.insert(
            (folder.to_string(), name.to_string()),
            CameraFile {
                mimetype: mimetype.to_string(),
                data,
            },
        );
    }
}

pub fn default_config() -> ConfigWidget {
    ConfigWidget::new(0, "main", "Camera and Driver Configuration", WidgetType::Window)
        .with_child(
            ConfigWidget::new(1, "settings", "Camera Settings", WidgetType::Section)
                .with_child(
                    ConfigWidget::new(2, "capturetarget", "Capture Target", WidgetType::Radio)
                        .with_choices(&["Internal RAM", "Memory card"])
                        .with_value("Internal RAM"),
                )
                .with_child(
                    ConfigWidget::new(3, "zoom", "Zoom", WidgetType::Range)
                        .with_range(0.0, 10.0, 1.0)
                        .with_value(0.0),
                ),
        )
        .with_child(
            ConfigWidget::new(4, "status", "Camera Status", WidgetType::Section).with_child(
                ConfigWidget::new(5, "cameramodel", "Camera Model", WidgetType::Text)
                    .with_value("Mock EOS")
                    .read_only(),
            ),
        )
}

pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 200]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("encode test image");
    buf.into_inner()
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            ports: vec![
                PortInfo {
                    name: "Universal Serial Bus".into(),
                    path: "usb:001,002".into(),
                },
                PortInfo {
                    name: "Universal Serial Bus".into(),
                    path: "usb:001,003".into(),
                },
            ],
            config: default_config(),
            folders: BTreeMap::new(),
            files: BTreeMap::new(),
            next_capture: CameraFilePath::new("/store", "capt0001.jpg"),
            fail_init: false,
            fail_exit: false,
            fail_get: None,
            overlaps: 0,
        }
    }
}

pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
    busy: Arc<AtomicBool>,
}

impl MockDriver {
    pub fn new(state: Arc<Mutex<MockState>>) -> Self {
        Self {
            state,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, MockState> {
        let overlapped = self.busy.swap(true, Ordering::SeqCst);
        // Widen the window in which a second caller could slip in
        thread::sleep(Duration::from_micros(200));
        self.busy.store(false, Ordering::SeqCst);

        let mut state = self.state.lock().unwrap();
        if overlapped {
            state.overlaps += 1;
        }
        state.calls.push(call);
        state
    }
}

impl CameraDriver for MockDriver {
    fn list_ports(&mut self) -> Result<Vec<PortInfo>> {
        Ok(self.record(Call::ListPorts).ports.clone())
    }

    fn set_port(&mut self, port: &PortInfo) -> Result<()> {
        drop(self.record(Call::SetPort(port.path.clone())));
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        if self.record(Call::Init).fail_init {
            return Err(CameraError::device("Could not claim the USB device"));
        }
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        if self.record(Call::Exit).fail_exit {
            return Err(CameraError::device("I/O problem"));
        }
        Ok(())
    }

    fn get_config(&mut self) -> Result<ConfigWidget> {
        Ok(self.record(Call::GetConfig).config.clone())
    }

    fn set_config(&mut self, config: &ConfigWidget) -> Result<()> {
        self.record(Call::SetConfig).config = config.clone();
        Ok(())
    }

    fn get_single_config(&mut self, name: &str) -> Result<ConfigWidget> {
        let state = self.record(Call::GetSingle(name.to_string()));
        if state.config.name == name {
            return Ok(state.config.clone());
        }
        state
            .config
            .find_child(name)
            .cloned()
            .ok_or_else(|| CameraError::not_found(format!("setting '{}'", name)))
    }

    fn set_single_config(&mut self, name: &str, widget: &ConfigWidget) -> Result<()> {
        let mut state = self.record(Call::SetSingle(name.to_string()));
        if state.config.replace(widget) {
            Ok(())
        } else {
            Err(CameraError::not_found(format!("setting '{}'", name)))
        }
    }

    fn capture(&mut self, _kind: CaptureKind) -> Result<CameraFilePath> {
        Ok(self.record(Call::Capture).next_capture.clone())
    }

    fn capture_preview(&mut self) -> Result<CameraFile> {
        drop(self.record(Call::Preview));
        Ok(CameraFile {
            mimetype: "image/png".into(),
            data: encode_image(64, 48, ImageFormat::Png),
        })
    }

    fn folder_list_folders(&mut self, folder: &str) -> Result<Vec<String>> {
        let state = self.record(Call::ListFolders(folder.to_string()));
        Ok(state.folders.get(folder).cloned().unwrap_or_default())
    }

    fn folder_list_files(&mut self, folder: &str) -> Result<Vec<String>> {
        let state = self.record(Call::ListFiles(folder.to_string()));
        Ok(state
            .files
            .keys()
            .filter(|(f, _)| f == folder)
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn file_get_info(&mut self, folder: &str, name: &str) -> Result<FileInfo> {
        let state = self.record(Call::FileInfo(name.to_string()));
        let file = state
            .files
            .get(&(folder.to_string(), name.to_string()))
            .ok_or_else(|| CameraError::not_found(name.to_string()))?;
        Ok(FileInfo {
            size: file.data.len() as u64,
            mtime: 1_700_000_000,
            permissions: 3,
            mimetype: file.mimetype.clone(),
            width: 0,
            height: 0,
        })
    }

    fn file_get(&mut self, folder: &str, name: &str) -> Result<CameraFile> {
        let state = self.record(Call::FileGet(name.to_string()));
        if state.fail_get.as_deref() == Some(name) {
            return Err(CameraError::device("I/O in progress"));
        }
        state
            .files
            .get(&(folder.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| CameraError::not_found(name.to_string()))
    }

    fn file_delete(&mut self, folder: &str, name: &str) -> Result<()> {
        let mut state = self.record(Call::FileDelete(name.to_string()));
        state
            .files
            .remove(&(folder.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| CameraError::not_found(name.to_string()))
    }

    fn summary(&mut self) -> Result<String> {
        drop(self.record(Call::Summary));
        Ok("Manufacturer: Mock\nModel: Mock EOS\n".into())
    }
}

/// Hands out one [`MockDriver`] per opened session and keeps their state
#[derive(Default)]
pub struct MockFactory {
    pub opened: AtomicUsize,
    pub states: Mutex<Vec<Arc<Mutex<MockState>>>>,
}

impl MockFactory {
    pub fn state(&self, index: usize) -> Arc<Mutex<MockState>> {
        self.states.lock().unwrap()[index].clone()
    }
}

impl DriverFactory for MockFactory {
    fn autodetect(&self) -> Result<Vec<DetectedCamera>> {
        Ok(vec![DetectedCamera {
            name: "Mock EOS".into(),
            port: "usb:001,002".into(),
        }])
    }

    fn open(&self) -> Result<Box<dyn CameraDriver>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let state = Arc::new(Mutex::new(MockState::default()));
        self.states.lock().unwrap().push(state.clone());
        Ok(Box::new(MockDriver::new(state)))
    }
}
