//! Editor session configuration.

use crate::canvas::Canvas;
use crate::format::Format;
use crate::layers::SerializableColor;
use serde::{Deserialize, Serialize};

/// Settings for a new editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format the first canvas is created at.
    pub format: Format,
    /// Canvas color behind all layers.
    pub background_color: SerializableColor,
    /// Whether a new session starts with the starter certificate layout.
    pub sample_layout: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            format: Format::default(),
            background_color: Canvas::DEFAULT_BACKGROUND,
            sample_layout: true,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn without_sample(mut self) -> Self {
        self.sample_layout = false;
        self
    }
}
