//! Flattening of the configuration tree into addressable settings
//!
//! Containers (window, section, menu) are consumed: only their
//! descendants are emitted, each with a slash-separated path built from
//! the machine names of its ancestors.

use serde::{Deserialize, Serialize};

use crate::error::{CameraError, Result};
use crate::widget::{ConfigWidget, WidgetRange, WidgetType, WidgetValue};

/// Externally addressable view of a single non-container widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDescriptor {
    pub id: i32,
    pub info: String,
    pub label: String,
    pub name: String,
    pub readonly: bool,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<WidgetRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WidgetValue>,
    pub path: String,
}

/// Flatten `root` depth-first, in tree order
pub fn flatten_config(root: &ConfigWidget) -> Result<Vec<ConfigDescriptor>> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    flatten_into(root, &mut path, &mut out)?;
    Ok(out)
}

fn flatten_into<'a>(
    widget: &'a ConfigWidget,
    path: &mut Vec<&'a str>,
    out: &mut Vec<ConfigDescriptor>,
) -> Result<()> {
    if !widget.widget_type.is_container() {
        out.push(describe(widget, path)?);
    }

    path.push(&widget.name);
    for child in &widget.children {
        flatten_into(child, path, out)?;
    }
    path.pop();
    Ok(())
}

fn describe(widget: &ConfigWidget, ancestors: &[&str]) -> Result<ConfigDescriptor> {
    let kind = widget.widget_type;

    let choices = if kind.has_choices() {
        Some(required(widget.choices.clone(), widget, "choices")?)
    } else {
        None
    };
    let range = if kind.has_range() {
        Some(required(widget.range, widget, "range")?)
    } else {
        None
    };
    let value = if kind.has_value() {
        Some(required(widget.value.clone(), widget, "value")?)
    } else {
        None
    };

    let mut path = String::new();
    for segment in ancestors.iter().copied().chain(std::iter::once(widget.name.as_str())) {
        path.push('/');
        path.push_str(segment);
    }

    Ok(ConfigDescriptor {
        id: widget.id,
        info: widget.info.clone(),
        label: widget.label.clone(),
        name: widget.name.clone(),
        readonly: widget.readonly,
        widget_type: kind,
        changed: widget.changed,
        choices,
        range,
        value,
        path,
    })
}

fn required<T>(attr: Option<T>, widget: &ConfigWidget, what: &str) -> Result<T> {
    attr.ok_or_else(|| {
        CameraError::device(format!(
            "{:?} widget '{}' did not report its {}",
            widget.widget_type, widget.name, what
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: i32, name: &str) -> ConfigWidget {
        ConfigWidget::new(id, name, name, WidgetType::Text).with_value("x")
    }

    #[test]
    fn test_section_yields_only_children() {
        let section = ConfigWidget::new(1, "status", "Status", WidgetType::Section)
            .with_child(text(2, "model"))
            .with_child(text(3, "serial"));

        let flat = flatten_config(&section).unwrap();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].path, "/status/model");
        assert_eq!(flat[1].path, "/status/serial");
        assert!(flat.iter().all(|d| d.name != "status"));
    }

    #[test]
    fn test_menu_at_depth_zero_is_filtered() {
        let menu = ConfigWidget::new(7, "focusmode", "Focus Mode", WidgetType::Menu)
            .with_choices(&["AF", "MF"])
            .with_value("AF");
        assert!(flatten_config(&menu).unwrap().is_empty());
    }

    #[test]
    fn test_window_root_and_path_order() {
        let tree = ConfigWidget::new(0, "main", "Camera", WidgetType::Window)
            .with_child(
                ConfigWidget::new(1, "actions", "Actions", WidgetType::Section)
                    .with_child(ConfigWidget::new(2, "autofocusdrive", "AF", WidgetType::Button)),
            )
            .with_child(
                ConfigWidget::new(3, "settings", "Settings", WidgetType::Section)
                    .with_child(
                        ConfigWidget::new(4, "iso", "ISO", WidgetType::Radio)
                            .with_choices(&["100", "200"])
                            .with_value("100"),
                    )
                    .with_child(
                        ConfigWidget::new(5, "zoom", "Zoom", WidgetType::Range)
                            .with_range(0.0, 10.0, 1.0)
                            .with_value(3.0),
                    ),
            );

        let flat = flatten_config(&tree).unwrap();
        let paths: Vec<&str> = flat.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/main/actions/autofocusdrive",
                "/main/settings/iso",
                "/main/settings/zoom"
            ]
        );

        let button = &flat[0];
        assert!(button.value.is_none() && button.choices.is_none() && button.range.is_none());
        assert_eq!(flat[1].choices.as_ref().map(Vec::len), Some(2));
        assert_eq!(flat[2].range, Some(WidgetRange::new(0.0, 10.0, 1.0)));
    }

    #[test]
    fn test_leaf_root_has_single_segment_path() {
        let flat = flatten_config(&text(9, "artist")).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].path, "/artist");
    }

    #[test]
    fn test_missing_required_attribute_is_device_error() {
        let broken = ConfigWidget::new(4, "iso", "ISO", WidgetType::Radio).with_value("100");
        let err = flatten_config(&broken).unwrap_err();
        assert!(matches!(err, CameraError::Device(_)));
    }

    #[test]
    fn test_descriptor_json_shape() {
        let flat = flatten_config(&text(2, "model")).unwrap();
        let json = serde_json::to_value(&flat[0]).unwrap();
        assert_eq!(json["type"], 2);
        assert_eq!(json["path"], "/model");
        assert_eq!(json["value"], "x");
        assert!(json.get("choices").is_none());
    }
}
