//! Configuration tree presented by the simulated camera

use luum_core::{ConfigWidget, WidgetType};

pub const CAPTURE_TARGETS: [&str; 2] = ["Internal RAM", "Memory card"];
pub const IMAGE_FORMATS: [&str; 3] = ["Large Fine JPEG", "Small Fine JPEG", "RAW + Large Fine JPEG"];

/// Build the initial configuration of a simulated camera
pub fn default_config(model: &str, serial: &str) -> ConfigWidget {
    let mut next_id = 0;
    let mut id = || {
        next_id += 1;
        next_id - 1
    };

    let root = ConfigWidget::new(id(), "main", "Camera and Driver Configuration", WidgetType::Window);

    let actions = ConfigWidget::new(id(), "actions", "Camera Actions", WidgetType::Section)
        .with_child(ConfigWidget::new(id(), "autofocusdrive", "Drive Canon DSLR Autofocus", WidgetType::Button))
        .with_child(
            ConfigWidget::new(id(), "viewfinder", "Canon EOS Viewfinder", WidgetType::Toggle)
                .with_value(false),
        );

    let settings = ConfigWidget::new(id(), "settings", "Camera Settings", WidgetType::Section)
        .with_child(
            ConfigWidget::new(id(), "datetime", "Camera Date and Time", WidgetType::Date)
                .with_value(1_700_000_000.0),
        )
        .with_child(ConfigWidget::new(id(), "artist", "Artist", WidgetType::Text).with_value(""))
        .with_child(
            ConfigWidget::new(id(), "capturetarget", "Capture Target", WidgetType::Radio)
                .with_choices(&CAPTURE_TARGETS)
                .with_value(CAPTURE_TARGETS[0]),
        );

    let image = ConfigWidget::new(id(), "imgsettings", "Image Settings", WidgetType::Section)
        .with_child(
            ConfigWidget::new(id(), "imageformat", "Image Format", WidgetType::Radio)
                .with_choices(&IMAGE_FORMATS)
                .with_value(IMAGE_FORMATS[0]),
        )
        .with_child(
            ConfigWidget::new(id(), "iso", "ISO Speed", WidgetType::Radio)
                .with_choices(&["Auto", "100", "200", "400", "800", "1600", "3200"])
                .with_value("Auto"),
        )
        .with_child(
            ConfigWidget::new(id(), "whitebalance", "WhiteBalance", WidgetType::Radio)
                .with_choices(&["Auto", "Daylight", "Shadow", "Cloudy", "Tungsten", "Fluorescent"])
                .with_value("Auto"),
        );

    let capture = ConfigWidget::new(id(), "capturesettings", "Capture Settings", WidgetType::Section)
        .with_child(
            ConfigWidget::new(id(), "focusmode", "Focus Mode", WidgetType::Menu)
                .with_choices(&["One Shot", "AI Servo", "Manual"])
                .with_value("One Shot"),
        )
        .with_child(
            ConfigWidget::new(id(), "aperture", "Aperture", WidgetType::Radio)
                .with_choices(&["2.8", "4", "5.6", "8", "11", "16"])
                .with_value("5.6"),
        )
        .with_child(
            ConfigWidget::new(id(), "zoom", "Zoom", WidgetType::Range)
                .with_range(0.0, 10.0, 1.0)
                .with_value(0.0)
                .with_info("Simulated optical zoom"),
        );

    let status = ConfigWidget::new(id(), "status", "Camera Status Information", WidgetType::Section)
        .with_child(
            ConfigWidget::new(id(), "cameramodel", "Camera Model", WidgetType::Text)
                .with_value(model)
                .read_only(),
        )
        .with_child(
            ConfigWidget::new(id(), "serialnumber", "Serial Number", WidgetType::Text)
                .with_value(serial)
                .read_only(),
        )
        .with_child(
            ConfigWidget::new(id(), "batterylevel", "Battery Level", WidgetType::Text)
                .with_value("100%")
                .read_only(),
        );

    root.with_child(actions)
        .with_child(settings)
        .with_child(image)
        .with_child(capture)
        .with_child(status)
}
