//! Application shell: owns the editor session and dispatches UI actions.

use std::path::{Path, PathBuf};

use certdraft_core::config::EditorConfig;
use certdraft_core::editor::{BackgroundOutcome, Editor, EditorError};
use certdraft_core::layers::SerializableColor;
use certdraft_core::pending::DecodedBackground;
use certdraft_core::sample::{SampleError, SampleRow, parse_sample_bytes};
use certdraft_render::{
    ExportFormat, ExportOptions, RasterRenderer, RenderContext, Renderer, RendererError,
    export_image, glyph_measure,
};
use image::RgbaImage;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loader::BackgroundLoader;
use crate::ui::{UiAction, UiState, UiStatus};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Failed to write preview: {0}")]
    Preview(#[from] image::ImageError),
    #[error("No sample data loaded; load a CSV or use the demo data first")]
    NoSession,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub editor: EditorConfig,
    /// Export multiplier, as a browser's device pixel ratio.
    pub device_pixel_ratio: f64,
    pub export_format: ExportFormat,
    /// Where downloads go; defaults to the format's file name.
    pub output: Option<PathBuf>,
    /// Outline color for the active layer in preview frames.
    pub selection_color: SerializableColor,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            device_pixel_ratio: 1.0,
            export_format: ExportFormat::Jpeg,
            output: None,
            selection_color: SerializableColor::new(59, 130, 246, 255),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Download path when an action doesn't name one.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.export_format.file_name()))
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    editor: Option<Editor>,
    status: UiStatus,
    loader: BackgroundLoader,
    renderer: RasterRenderer,
    /// Last preview frame, redrawn whenever the editor reports a change.
    frame: Option<RgbaImage>,
    /// Failed actions and background loads so far.
    failures: usize,
    /// Message of the most recent failure since the current action began.
    last_error: Option<String>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            editor: None,
            status: UiStatus::AwaitingData,
            loader: BackgroundLoader::new(),
            renderer: RasterRenderer::new(),
            frame: None,
            failures: 0,
            last_error: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn status(&self) -> &UiStatus {
        &self.status
    }

    /// The latest preview frame, if a session is open.
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    /// Failed actions and background loads since the app started.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Dispatch one action, then collect finished backgrounds and redraw.
    ///
    /// A background that fails to load while this runs is counted and shown
    /// as the last error, but doesn't fail the action.
    pub fn handle(&mut self, action: UiAction) -> Result<(), AppError> {
        log::debug!("Action: {:?}", action);
        self.last_error = None;
        let dispatched = self.dispatch(action);
        let result = dispatched.and(self.poll_backgrounds());
        if let Err(e) = &result {
            self.record_failure(e);
        }
        result
    }

    /// Run actions in order. A failed action is logged and the rest still run.
    /// Returns the number of failures, background loads included.
    pub fn run(&mut self, actions: impl IntoIterator<Item = UiAction>) -> usize {
        let before = self.failures;
        for action in actions {
            // Failures are logged and counted by `handle`.
            let _ = self.handle(action);
        }
        self.failures - before
    }

    fn record_failure(&mut self, error: &AppError) {
        log::error!("{}", error);
        self.failures += 1;
        self.last_error = Some(error.to_string());
    }

    fn dispatch(&mut self, action: UiAction) -> Result<(), AppError> {
        match action {
            UiAction::LoadCsv { path } => {
                let data = match std::fs::read(&path) {
                    Ok(data) => data,
                    Err(e) => {
                        self.fail_sample(e.to_string());
                        return Err(e.into());
                    }
                };
                self.load_csv_bytes(&data)
            }
            UiAction::UseDemoData => {
                self.start_session(SampleRow::demo());
                Ok(())
            }
            UiAction::AddField { field } => {
                self.editor_mut()?.add_field(&field)?;
                Ok(())
            }
            UiAction::AddTextbox { text } => {
                self.editor_mut()?.add_textbox(&text);
                Ok(())
            }
            UiAction::UploadBackground { path } => {
                let token = self.editor_mut()?.canvas_token();
                self.loader.submit(token, path);
                Ok(())
            }
            UiAction::BringForward => {
                self.editor_mut()?.bring_active_forward();
                Ok(())
            }
            UiAction::SendBackward => {
                self.editor_mut()?.send_active_backward();
                Ok(())
            }
            UiAction::Delete => {
                if self.editor_mut()?.delete_active().is_none() {
                    log::debug!("Delete ignored: nothing selected");
                }
                Ok(())
            }
            UiAction::ChangeFormat { format } => {
                self.editor_mut()?.change_format(format);
                Ok(())
            }
            UiAction::SelectLayer { index } => {
                let editor = self.editor_mut()?;
                match editor.layer_at_index(index) {
                    Some(id) => {
                        editor.select_layer(id);
                    }
                    None => log::debug!("No layer at index {}", index),
                }
                Ok(())
            }
            UiAction::Click { x, y } => {
                self.editor_mut()?.click(Point::new(x, y));
                Ok(())
            }
            UiAction::AlignHorizontalCenter => {
                self.editor_mut()?.align_horizontal_center();
                Ok(())
            }
            UiAction::AlignVerticalCenter => {
                self.editor_mut()?.align_vertical_center();
                Ok(())
            }
            UiAction::Download { path } => {
                let path = path.unwrap_or_else(|| self.config.output_path());
                self.download(&path)
            }
        }
    }

    /// Start a session from CSV text. On failure the previous session is closed.
    pub fn load_csv_text(&mut self, text: &str) -> Result<(), AppError> {
        self.load_csv_bytes(text.as_bytes())
    }

    /// Start a session from raw CSV file contents.
    pub fn load_csv_bytes(&mut self, data: &[u8]) -> Result<(), AppError> {
        match parse_sample_bytes(data) {
            Ok(row) => {
                self.start_session(row);
                Ok(())
            }
            Err(SampleError::NoRows) => {
                log::warn!("CSV has a header but no data rows");
                self.close_session(UiStatus::AwaitingData);
                Err(SampleError::NoRows.into())
            }
            Err(e) => {
                self.fail_sample(e.to_string());
                Err(e.into())
            }
        }
    }

    fn start_session(&mut self, row: SampleRow) {
        // Drop the old session before opening the next one.
        self.editor = None;
        self.editor = Some(Editor::with_measure(
            row,
            self.config.editor.clone(),
            Box::new(glyph_measure()),
        ));
        self.status = UiStatus::Editing;
    }

    fn fail_sample(&mut self, message: String) {
        self.close_session(UiStatus::Error { message });
    }

    fn close_session(&mut self, status: UiStatus) {
        self.editor = None;
        self.frame = None;
        self.status = status;
    }

    fn editor_mut(&mut self) -> Result<&mut Editor, AppError> {
        self.editor.as_mut().ok_or(AppError::NoSession)
    }

    /// Apply backgrounds that finished loading, without blocking, and
    /// redraw the preview.
    pub fn poll_backgrounds(&mut self) -> Result<(), AppError> {
        let done = self.loader.poll();
        self.apply_backgrounds(done);
        self.redraw()
    }

    /// Block until every queued background has loaded, apply them and
    /// redraw the preview.
    pub fn wait_backgrounds(&mut self) -> Result<(), AppError> {
        let done = self.loader.wait();
        self.apply_backgrounds(done);
        self.redraw()
    }

    /// Install finished backgrounds. Decode failures are counted and
    /// become the last error.
    fn apply_backgrounds(&mut self, done: Vec<DecodedBackground>) {
        for decoded in done {
            let Some(editor) = self.editor.as_mut() else {
                log::debug!("Dropping background for canvas {}: no session", decoded.token);
                continue;
            };
            match editor.complete_background(decoded) {
                Ok(BackgroundOutcome::Installed(id)) => log::info!("Background {} installed", id),
                Ok(BackgroundOutcome::Discarded) => {}
                Err(e) => self.record_failure(&AppError::from(e)),
            }
        }
    }

    /// Render a new preview frame if anything changed.
    fn redraw(&mut self) -> Result<(), AppError> {
        let Some(editor) = self.editor.as_mut() else {
            return Ok(());
        };
        if !editor.take_redraw() {
            return Ok(());
        }
        let ctx = RenderContext::new(editor.canvas())
            .with_selection(editor.active())
            .with_selection_color(self.config.selection_color.into());
        self.frame = Some(self.renderer.render(&ctx)?);
        Ok(())
    }

    /// Export the canvas to `path`. Pending backgrounds are waited for first.
    pub fn download(&mut self, path: &Path) -> Result<(), AppError> {
        self.wait_backgrounds()?;
        let editor = self.editor.as_ref().ok_or(AppError::NoSession)?;
        let options = ExportOptions::default()
            .with_format(self.config.export_format)
            .with_scale(self.config.device_pixel_ratio);
        let exported = export_image(editor.canvas(), &options)?;
        std::fs::write(path, &exported.bytes)?;
        log::info!(
            "Downloaded {}x{} {} to {:?}",
            exported.width,
            exported.height,
            exported.format,
            path
        );
        Ok(())
    }

    /// Write the current preview frame as PNG.
    pub fn save_preview(&self, path: &Path) -> Result<(), AppError> {
        let frame = self.frame.as_ref().ok_or(AppError::NoSession)?;
        frame.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Snapshot for drawing the controls.
    pub fn ui_state(&self) -> UiState {
        let Some(editor) = self.editor.as_ref() else {
            return UiState {
                last_error: self.last_error.clone(),
                ..UiState::idle(self.status.clone(), self.config.editor.format)
            };
        };
        let layers = editor.list_layers().to_vec();
        let active_index = editor
            .active()
            .and_then(|id| layers.iter().position(|entry| entry.id == id));
        let (width, height) = editor.dimensions();
        UiState {
            status: self.status.clone(),
            available_fields: editor
                .available_fields()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            layers,
            active_index,
            delete_enabled: editor.can_delete(),
            format: editor.format(),
            width,
            height,
            pending_backgrounds: self.loader.pending(),
            last_error: self.last_error.clone(),
        }
    }
}
