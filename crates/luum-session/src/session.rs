//! Thread-safe wrapper around a single camera connection
//!
//! The driver allows one in-flight call and makes connecting expensive,
//! so every device-touching operation runs under the session's lock and
//! the connected state is tracked to avoid repeated initialisation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use luum_core::imaging::{self, REENCODED_MIMETYPE};
use luum_core::{
    flatten_config, CameraDriver, CameraError, CameraFile, CameraFilePath, CaptureKind,
    ConfigDescriptor, FileEntry, Result, WidgetValue,
};
use tracing::{debug, info, warn};

use crate::hierarchy::file_hierarchy;
use crate::package::{package_capture, CapturePackage};
use crate::preview::PreviewFrames;

/// Setting that selects where captures are stored
pub const CAPTURE_TARGET_SETTING: &str = "capturetarget";

/// Per-session behaviour shared by every session of a registry
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Value forced into the capture target setting before each capture
    pub capture_target: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capture_target: "Memory card".to_string(),
        }
    }
}

/// State guarded by the session lock
struct Connection {
    driver: Box<dyn CameraDriver>,
    connected: bool,
}

impl Connection {
    fn connect(&mut self, port: &str) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        info!(port = %port, "Connecting to camera");
        let to_connection_error = |e: CameraError| {
            if matches!(e, CameraError::Connection { .. }) {
                e
            } else {
                CameraError::connection(port, e.to_string())
            }
        };

        let ports = self.driver.list_ports().map_err(to_connection_error)?;
        let info = ports
            .into_iter()
            .find(|p| p.path == port)
            .ok_or_else(|| CameraError::connection(port, "no such port"))?;
        self.driver.set_port(&info).map_err(to_connection_error)?;
        self.driver.init().map_err(to_connection_error)?;

        self.connected = true;
        info!(port = %port, transport = %info.name, "Camera connected");
        Ok(())
    }

    /// Tear down the driver session. Never fails: a failed exit still
    /// leaves the session disconnected so it can be reconnected later.
    fn disconnect(&mut self, port: &str) {
        if !self.connected {
            return;
        }
        if let Err(e) = self.driver.exit() {
            warn!(port = %port, error = %e, "Camera exit failed, marking disconnected anyway");
        }
        self.connected = false;
        info!(port = %port, "Camera disconnected");
    }
}

/// Exclusive-access wrapper around one camera
pub struct CameraSession {
    port: String,
    options: SessionOptions,
    conn: Mutex<Connection>,
}

impl CameraSession {
    /// Create an unconnected session for `port`
    pub fn new(port: &str, driver: Box<dyn CameraDriver>, options: SessionOptions) -> Self {
        Self {
            port: port.to_string(),
            options,
            conn: Mutex::new(Connection {
                driver,
                connected: false,
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    // A panic mid-operation leaves only a flag and a handle behind, both
    // still consistent, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connect unless already connected
    pub fn connect(&self) -> Result<()> {
        self.lock().connect(&self.port)
    }

    /// Disconnect if connected; teardown errors are logged, not returned
    pub fn disconnect(&self) {
        self.lock().disconnect(&self.port)
    }

    /// Every setting of the camera, flattened
    pub fn read_all_config(&self) -> Result<Vec<ConfigDescriptor>> {
        let config = self.lock().driver.get_config()?;
        let settings = flatten_config(&config)?;
        debug!(port = %self.port, count = settings.len(), "Read camera configuration");
        Ok(settings)
    }

    /// A single setting by machine name
    pub fn read_one_config(&self, name: &str) -> Result<ConfigDescriptor> {
        let widget = self.lock().driver.get_single_config(name)?;
        if widget.widget_type.is_container() {
            return Err(CameraError::validation(format!(
                "'{}' is a group of settings, not a setting",
                name
            )));
        }
        flatten_config(&widget)?
            .into_iter()
            .next()
            .ok_or_else(|| CameraError::not_found(format!("setting '{}'", name)))
    }

    /// Validate and commit a new value for a setting.
    ///
    /// Returns the driver's "changed" flag read back after the commit.
    /// Drivers report false negatives, so it is informational only.
    pub fn write_config(&self, name: &str, value: WidgetValue) -> Result<bool> {
        let shown = value.to_string();
        let changed = {
            let mut conn = self.lock();
            let mut widget = conn.driver.get_single_config(name)?;
            widget.set_value(value)?;
            conn.driver.set_single_config(name, &widget)?;
            conn.driver.get_single_config(name)?.changed
        };
        info!(port = %self.port, name = %name, value = %shown, changed, "Wrote camera setting");
        Ok(changed)
    }

    fn capture_locked(&self, conn: &mut Connection, kind: CaptureKind) -> Result<CameraFilePath> {
        // After live view the driver fails the next capture with an I/O
        // error unless it has been re-initialised.
        conn.disconnect(&self.port);
        conn.connect(&self.port)?;

        let mut config = conn.driver.get_config()?;
        match config.find_child_mut(CAPTURE_TARGET_SETTING) {
            Some(target) => {
                target.set_value(WidgetValue::Text(self.options.capture_target.clone()))?;
                conn.driver.set_config(&config)?;
            }
            None => warn!(port = %self.port, "Camera has no capture target setting"),
        }

        let file = conn.driver.capture(kind)?;
        info!(port = %self.port, kind = %kind, file = %file, "Captured");
        Ok(file)
    }

    /// Capture to the memory card and return where the file landed
    pub fn capture(&self, kind: CaptureKind) -> Result<CameraFilePath> {
        let mut conn = self.lock();
        self.capture_locked(&mut conn, kind)
    }

    /// Capture, then archive the captured file together with its siblings
    /// and remove them from the card
    pub fn capture_and_package(&self, kind: CaptureKind) -> Result<CapturePackage> {
        let mut conn = self.lock();
        let file = self.capture_locked(&mut conn, kind)?;
        package_capture(conn.driver.as_mut(), &file)
    }

    /// Grab one live-view frame, re-encoded if `size` or `quality` is set
    pub fn preview_frame(&self, size: u32, quality: u8) -> Result<CameraFile> {
        let frame = self.lock().driver.capture_preview()?;
        reencode_file(frame, size, quality)
    }

    /// Endless multipart stream of live-view frames. The lock is taken
    /// once per frame, so other operations interleave with the stream.
    pub fn preview_frames(self: &Arc<Self>, size: u32, quality: u8) -> PreviewFrames {
        PreviewFrames::new(Arc::clone(self), size, quality)
    }

    /// Fetch a stored file by its absolute camera path
    pub fn download(&self, path: &str, size: u32, quality: u8) -> Result<CameraFile> {
        let location = CameraFilePath::parse(path)?;
        let file = self
            .lock()
            .driver
            .file_get(&location.folder, &location.name)?;
        debug!(port = %self.port, file = %location, bytes = file.data.len(), "Downloaded");
        reencode_file(file, size, quality)
    }

    /// The camera's storage tree rooted at `/`
    pub fn get_file_hierarchy(&self) -> Result<FileEntry> {
        let mut conn = self.lock();
        file_hierarchy(conn.driver.as_mut())
    }

    pub fn get_summary(&self) -> Result<String> {
        self.lock().driver.summary()
    }
}

fn reencode_file(file: CameraFile, size: u32, quality: u8) -> Result<CameraFile> {
    if !imaging::wants_reencode(size, quality) {
        return Ok(file);
    }
    Ok(CameraFile {
        mimetype: REENCODED_MIMETYPE.to_string(),
        data: imaging::reencode(&file.data, size, quality)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{encode_image, Call, MockDriver, MockState};
    use luum_core::ErrorKind;
    use image::{GenericImageView, ImageFormat};

    fn session() -> (CameraSession, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        let driver = MockDriver::new(state.clone());
        let session = CameraSession::new("usb:001,002", Box::new(driver), SessionOptions::default());
        (session, state)
    }

    #[test]
    fn test_connect_is_idempotent() {
        let (session, state) = session();
        session.connect().unwrap();
        session.connect().unwrap();
        assert!(session.is_connected());

        let s = state.lock().unwrap();
        assert_eq!(s.count(&Call::Init), 1);
        assert_eq!(s.count(&Call::SetPort("usb:001,002".into())), 1);
    }

    #[test]
    fn test_unknown_port_is_connection_error() {
        let state = Arc::new(Mutex::new(MockState::default()));
        let session = CameraSession::new(
            "usb:009,009",
            Box::new(MockDriver::new(state.clone())),
            SessionOptions::default(),
        );
        let err = session.connect().unwrap_err();
        assert!(matches!(err, CameraError::Connection { .. }));
        assert!(!session.is_connected());
        assert_eq!(state.lock().unwrap().count(&Call::Init), 0);
    }

    #[test]
    fn test_failed_init_leaves_disconnected() {
        let (session, state) = session();
        state.lock().unwrap().fail_init = true;
        assert!(matches!(
            session.connect(),
            Err(CameraError::Connection { .. })
        ));
        assert!(!session.is_connected());

        session.disconnect();
        assert_eq!(state.lock().unwrap().count(&Call::Exit), 0);
    }

    #[test]
    fn test_disconnect_forces_state_on_exit_failure() {
        let (session, state) = session();
        session.connect().unwrap();
        state.lock().unwrap().fail_exit = true;

        session.disconnect();
        assert!(!session.is_connected());

        session.disconnect();
        assert_eq!(state.lock().unwrap().count(&Call::Exit), 1);

        session.connect().unwrap();
        assert_eq!(state.lock().unwrap().count(&Call::Init), 2);
    }

    #[test]
    fn test_read_all_config_skips_containers() {
        let (session, _) = session();
        session.connect().unwrap();
        let settings = session.read_all_config().unwrap();
        let paths: Vec<&str> = settings.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/main/settings/capturetarget",
                "/main/settings/zoom",
                "/main/status/cameramodel"
            ]
        );
    }

    #[test]
    fn test_read_one_config() {
        let (session, _) = session();
        let zoom = session.read_one_config("zoom").unwrap();
        assert_eq!(zoom.path, "/zoom");
        assert_eq!(zoom.value, Some(WidgetValue::Number(0.0)));

        assert!(matches!(
            session.read_one_config("settings"),
            Err(CameraError::Validation(_))
        ));
        assert!(matches!(
            session.read_one_config("nonexistent"),
            Err(CameraError::NotFound(_))
        ));
    }

    #[test]
    fn test_write_config_commits_and_reads_back() {
        let (session, state) = session();
        let changed = session.write_config("zoom", 4.0.into()).unwrap();
        assert!(changed);
        assert_eq!(
            session.read_one_config("zoom").unwrap().value,
            Some(WidgetValue::Number(4.0))
        );
        assert_eq!(state.lock().unwrap().count(&Call::SetSingle("zoom".into())), 1);
    }

    #[test]
    fn test_write_out_of_range_never_commits() {
        let (session, state) = session();
        let err = session.write_config("zoom", 11.0.into()).unwrap_err();
        assert!(matches!(err, CameraError::Validation(_)));

        let s = state.lock().unwrap();
        assert!(!s.calls.iter().any(|c| matches!(c, Call::SetSingle(_))));
    }

    #[test]
    fn test_write_unknown_setting_is_not_found() {
        let (session, _) = session();
        assert!(matches!(
            session.write_config("shutterspeed", "1/100".into()),
            Err(CameraError::NotFound(_))
        ));
    }

    #[test]
    fn test_capture_reconnects_and_targets_card() {
        let (session, state) = session();
        session.connect().unwrap();

        let file = session.capture(CaptureKind::Image).unwrap();
        assert_eq!(file, CameraFilePath::new("/store", "capt0001.jpg"));

        let s = state.lock().unwrap();
        let tail: Vec<&Call> = s
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Exit | Call::Init | Call::SetConfig | Call::Capture))
            .collect();
        assert_eq!(
            tail,
            vec![&Call::Init, &Call::Exit, &Call::Init, &Call::SetConfig, &Call::Capture]
        );
        assert_eq!(
            s.config.find_child(CAPTURE_TARGET_SETTING).unwrap().value,
            Some(WidgetValue::Text("Memory card".into()))
        );
    }

    #[test]
    fn test_capture_and_package_collects_siblings() {
        let (session, state) = session();
        {
            let mut s = state.lock().unwrap();
            s.next_capture = CameraFilePath::new("/store", "IMG_0001.JPG");
            s.add_file("/store", "IMG_0001.JPG", "image/jpeg", b"jpeg".to_vec());
            s.add_file("/store", "IMG_0001.RAW", "image/x-raw", b"raw".to_vec());
        }
        session.connect().unwrap();

        let pkg = session.capture_and_package(CaptureKind::Image).unwrap();
        assert_eq!(pkg.name, "IMG_0001.zip");

        let archive = zip::ZipArchive::new(std::io::Cursor::new(pkg.data)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["IMG_0001.JPG", "IMG_0001.RAW"]);

        let s = state.lock().unwrap();
        let deletes = s
            .calls
            .iter()
            .filter(|c| matches!(c, Call::FileDelete(_)))
            .count();
        assert_eq!(deletes, 2);
    }

    #[test]
    fn test_download_raw_and_reencoded() {
        let (session, state) = session();
        let source = encode_image(4000, 3000, ImageFormat::Png);
        state
            .lock()
            .unwrap()
            .add_file("/store/DCIM", "IMG_0001.PNG", "image/png", source.clone());

        let raw = session.download("/store/DCIM/IMG_0001.PNG", 0, 0).unwrap();
        assert_eq!(raw.mimetype, "image/png");
        assert_eq!(raw.data, source);

        let thumb = session.download("/store/DCIM/IMG_0001.PNG", 100, 0).unwrap();
        assert_eq!(thumb.mimetype, "image/jpeg");
        let img = image::load_from_memory(&thumb.data).unwrap();
        let (w, h) = img.dimensions();
        assert!(w.max(h) <= 100);
        assert_eq!((w, h), (100, 75));
    }

    #[test]
    fn test_download_unknown_file() {
        let (session, _) = session();
        assert!(matches!(
            session.download("/store/nope.jpg", 0, 0),
            Err(CameraError::NotFound(_))
        ));
    }

    #[test]
    fn test_resizing_a_raw_file_is_rejected() {
        let (session, state) = session();
        state
            .lock()
            .unwrap()
            .add_file("/store", "IMG_0001.CR2", "image/x-canon-cr2", b"raw sensor data".to_vec());

        let err = session.download("/store/IMG_0001.CR2", 100, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(session.download("/store/IMG_0001.CR2", 0, 0).is_ok());
    }

    #[test]
    fn test_summary_verbatim() {
        let (session, _) = session();
        assert_eq!(
            session.get_summary().unwrap(),
            "Manufacturer: Mock\nModel: Mock EOS\n"
        );
    }
}
