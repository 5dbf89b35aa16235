//! Camera configuration widget tree
//!
//! Cameras describe their settings as a tree of widgets: containers
//! (window, section, menu) group leaf settings that carry a value. The
//! driver hands out owned snapshots of this tree; edits are made on the
//! snapshot and committed back through the driver.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CameraError, Result};

/// Declared type of a configuration widget, serialized as the driver's numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WidgetType {
    Window = 0,
    Section = 1,
    Text = 2,
    Range = 3,
    Toggle = 4,
    Radio = 5,
    Menu = 6,
    Button = 7,
    Date = 8,
}

impl WidgetType {
    /// Structural nodes that only group other widgets
    pub fn is_container(self) -> bool {
        matches!(self, Self::Window | Self::Section | Self::Menu)
    }

    pub fn has_choices(self) -> bool {
        matches!(self, Self::Radio | Self::Menu)
    }

    pub fn has_range(self) -> bool {
        matches!(self, Self::Range)
    }

    pub fn has_value(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Range | Self::Toggle | Self::Radio | Self::Menu | Self::Date
        )
    }
}

impl From<WidgetType> for u8 {
    fn from(t: WidgetType) -> u8 {
        t as u8
    }
}

impl TryFrom<u8> for WidgetType {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Window,
            1 => Self::Section,
            2 => Self::Text,
            3 => Self::Range,
            4 => Self::Toggle,
            5 => Self::Radio,
            6 => Self::Menu,
            7 => Self::Button,
            8 => Self::Date,
            other => return Err(format!("unknown widget type {}", other)),
        })
    }
}

/// Current value of a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetValue {
    Toggle(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for WidgetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for WidgetValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for WidgetValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for WidgetValue {
    fn from(b: bool) -> Self {
        Self::Toggle(b)
    }
}

/// Numeric bounds of a range widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl WidgetRange {
    pub fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= f64::from(self.min) && value <= f64::from(self.max)
    }
}

/// One node of a camera's configuration tree
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWidget {
    pub id: i32,
    /// Machine name, stable across locales
    pub name: String,
    /// Human-readable label
    pub label: String,
    pub info: String,
    pub readonly: bool,
    pub widget_type: WidgetType,
    /// Set when the value was modified since the last commit
    pub changed: bool,
    pub value: Option<WidgetValue>,
    pub choices: Option<Vec<String>>,
    pub range: Option<WidgetRange>,
    pub children: Vec<ConfigWidget>,
}

impl ConfigWidget {
    pub fn new(id: i32, name: &str, label: &str, widget_type: WidgetType) -> Self {
        Self {
            id,
            name: name.to_string(),
            label: label.to_string(),
            info: String::new(),
            readonly: false,
            widget_type,
            changed: false,
            value: None,
            choices: None,
            range: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<WidgetValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_choices<S: AsRef<str>>(mut self, choices: &[S]) -> Self {
        self.choices = Some(choices.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn with_range(mut self, min: f32, max: f32, step: f32) -> Self {
        self.range = Some(WidgetRange::new(min, max, step));
        self
    }

    pub fn with_info(mut self, info: &str) -> Self {
        self.info = info.to_string();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn with_child(mut self, child: ConfigWidget) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search of the descendants by machine name
    pub fn find_child(&self, name: &str) -> Option<&ConfigWidget> {
        self.children.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find_child(name)
            }
        })
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut ConfigWidget> {
        for child in self.children.iter_mut() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_child_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// Swap in `widget` for the node with the same machine name, searching
    /// this widget and its descendants. Returns whether a node matched.
    pub fn replace(&mut self, widget: &ConfigWidget) -> bool {
        if self.name == widget.name {
            *self = widget.clone();
            return true;
        }
        self.children.iter_mut().any(|child| child.replace(widget))
    }

    /// Validate `value` against the declared type and store it
    pub fn set_value(&mut self, value: WidgetValue) -> Result<()> {
        if self.readonly {
            return Err(CameraError::validation(format!(
                "setting '{}' is read-only",
                self.name
            )));
        }

        let accepted = match (self.widget_type, value) {
            (WidgetType::Text, WidgetValue::Text(s)) => WidgetValue::Text(s),
            (WidgetType::Range, WidgetValue::Number(n)) => {
                let range = self.range.ok_or_else(|| {
                    CameraError::device(format!("range widget '{}' reports no range", self.name))
                })?;
                if !range.contains(n) {
                    return Err(CameraError::validation(format!(
                        "{} is outside [{}, {}] for '{}'",
                        n, range.min, range.max, self.name
                    )));
                }
                WidgetValue::Number(n)
            }
            (WidgetType::Toggle, WidgetValue::Toggle(b)) => WidgetValue::Toggle(b),
            (WidgetType::Toggle, WidgetValue::Number(n)) if n == 0.0 || n == 1.0 => {
                WidgetValue::Toggle(n == 1.0)
            }
            (WidgetType::Radio | WidgetType::Menu, WidgetValue::Text(s)) => {
                let choices = self.choices.as_deref().unwrap_or_default();
                if !choices.iter().any(|c| c == &s) {
                    return Err(CameraError::validation(format!(
                        "'{}' is not a valid choice for '{}'",
                        s, self.name
                    )));
                }
                WidgetValue::Text(s)
            }
            (WidgetType::Date, WidgetValue::Number(n)) if n.fract() == 0.0 => WidgetValue::Number(n),
            (WidgetType::Window | WidgetType::Section | WidgetType::Button, _) => {
                return Err(CameraError::validation(format!(
                    "'{}' does not hold a value",
                    self.name
                )));
            }
            (widget_type, value) => {
                return Err(CameraError::validation(format!(
                    "value {} does not match {:?} setting '{}'",
                    value, widget_type, self.name
                )));
            }
        };

        self.value = Some(accepted);
        self.changed = true;
        Ok(())
    }
}
