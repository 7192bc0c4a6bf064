//! UI actions and the state the controls are drawn from.

use std::path::PathBuf;

use certdraft_core::format::Format;
use certdraft_core::panel::LayerEntry;
use serde::{Deserialize, Serialize};

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiAction {
    /// Start a session from the first row of a CSV file.
    LoadCsv { path: PathBuf },
    /// Start a session with the built-in demo row.
    UseDemoData,
    /// Add the value of a sample field as a text layer.
    AddField { field: String },
    /// Add a wrapped text box.
    AddTextbox {
        #[serde(default)]
        text: String,
    },
    /// Load an image file as the canvas background.
    UploadBackground { path: PathBuf },
    BringForward,
    SendBackward,
    /// Delete the active layer.
    Delete,
    /// Switch canvas format. Drops all layers.
    ChangeFormat { format: Format },
    /// Select the layers panel row at `index` (back to front).
    SelectLayer { index: usize },
    /// Click the canvas at a point.
    Click { x: f64, y: f64 },
    AlignHorizontalCenter,
    AlignVerticalCenter,
    /// Export the canvas to `path`, or to the configured output.
    Download {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl UiAction {
    /// Parse a JSON array of actions.
    pub fn script_from_json(json: &str) -> Result<Vec<UiAction>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// What the main area shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UiStatus {
    /// No sample data yet: "select a CSV to get started".
    AwaitingData,
    /// The last CSV could not be read.
    Error { message: String },
    /// A session is open.
    Editing,
}

/// Snapshot of everything the controls display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState {
    pub status: UiStatus,
    /// Field buttons as (name, value), in column order.
    pub available_fields: Vec<(String, String)>,
    /// Layers panel rows, back to front.
    pub layers: Vec<LayerEntry>,
    /// Index of the active layer in `layers`.
    pub active_index: Option<usize>,
    pub delete_enabled: bool,
    pub format: Format,
    pub width: u32,
    pub height: u32,
    /// Backgrounds still loading.
    pub pending_backgrounds: usize,
    /// Most recent failure, such as a background that could not be decoded.
    pub last_error: Option<String>,
}

impl UiState {
    /// State before any session exists.
    pub fn idle(status: UiStatus, format: Format) -> Self {
        let (width, height) = format.dimensions();
        Self {
            status,
            available_fields: Vec::new(),
            layers: Vec::new(),
            active_index: None,
            delete_enabled: false,
            format,
            width,
            height,
            pending_backgrounds: 0,
            last_error: None,
        }
    }

    /// Human readable summary, one line per item.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        match &self.status {
            UiStatus::AwaitingData => out.push_str("Select a CSV to get started\n"),
            UiStatus::Error { message } => out.push_str(&format!("Error: {message}\n")),
            UiStatus::Editing => {}
        }
        if let Some(message) = &self.last_error {
            out.push_str(&format!("Last error: {message}\n"));
        }
        out.push_str(&format!("Format {} ({}x{})\n", self.format, self.width, self.height));
        for (name, value) in &self.available_fields {
            out.push_str(&format!("[Add {name}] {value}\n"));
        }
        for (i, entry) in self.layers.iter().enumerate() {
            let marker = if self.active_index == Some(i) { '*' } else { ' ' };
            out.push_str(&format!("{marker}{i}: {}\n", entry.label));
        }
        out
    }
}
