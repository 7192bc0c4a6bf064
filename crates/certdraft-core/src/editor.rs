//! Editor session: one sample row, one live canvas, and the UI state
//! mirrored from it.

use crate::canvas::{Canvas, CanvasToken, SceneEvent};
use crate::config::EditorConfig;
use crate::factory::LayerFactory;
use crate::format::Format;
use crate::layers::{
    DecodedImage, ImageError, LayerId, MonospaceMeasure, TextMeasure, decode_data_uri,
};
use crate::panel::{LayerEntry, LayersPanel};
use crate::pending::{BackgroundRequest, DecodedBackground};
use crate::sample::SampleRow;
use crate::selection::Selection;
use kurbo::{Point, Vec2};
use thiserror::Error;

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Background image failed: {0}")]
    Image(#[from] ImageError),
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// What happened to a completed background request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// The image was installed as the background.
    Installed(LayerId),
    /// The canvas was replaced while decoding; the result was dropped.
    Discarded,
}

/// An editing session over a single canvas at a time.
///
/// The session owns the canvas. Replacing it (on a format change) drops
/// the old one, and dropping the session disposes the current one.
pub struct Editor {
    config: EditorConfig,
    sample: SampleRow,
    canvas: Canvas,
    selection: Selection,
    panel: LayersPanel,
    measure: Box<dyn TextMeasure>,
    needs_redraw: bool,
}

impl Editor {
    /// Start a session with the default text measure.
    pub fn new(sample: SampleRow, config: EditorConfig) -> Self {
        Self::with_measure(sample, config, Box::new(MonospaceMeasure::default()))
    }

    /// Start a session that lays text out with `measure`.
    pub fn with_measure(
        sample: SampleRow,
        config: EditorConfig,
        measure: Box<dyn TextMeasure>,
    ) -> Self {
        let canvas = Canvas::new(config.format, config.background_color);
        log::info!(
            "Starting editor session on canvas {} ({}, {} field(s))",
            canvas.token(),
            config.format,
            sample.len()
        );
        let mut editor = Self {
            config,
            sample,
            canvas,
            selection: Selection::new(),
            panel: LayersPanel::new(),
            measure,
            needs_redraw: true,
        };
        if editor.config.sample_layout {
            LayerFactory::new(editor.measure.as_ref()).draw_sample(&mut editor.canvas);
        }
        editor.sync();
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn sample(&self) -> &SampleRow {
        &self.sample
    }

    /// Fields offered as "Add" buttons.
    pub fn available_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sample.available_fields()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_token(&self) -> CanvasToken {
        self.canvas.token()
    }

    pub fn format(&self) -> Format {
        self.canvas.format()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.format().dimensions()
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// Add a text layer showing the sample value of `field`.
    pub fn add_field(&mut self, field: &str) -> Result<LayerId, EditorError> {
        let value = self
            .sample
            .available_fields()
            .find(|(key, _)| *key == field)
            .map(|(_, value)| value.to_string())
            .ok_or_else(|| EditorError::UnknownField(field.to_string()))?;
        Ok(self.add_text(&value))
    }

    /// Add a horizontally centered text layer.
    pub fn add_text(&mut self, value: &str) -> LayerId {
        let id = LayerFactory::new(self.measure.as_ref()).add_text(&mut self.canvas, value);
        self.sync();
        id
    }

    /// Add a horizontally centered text box.
    pub fn add_textbox(&mut self, value: &str) -> LayerId {
        let id = LayerFactory::new(self.measure.as_ref()).add_textbox(&mut self.canvas, value);
        self.sync();
        id
    }

    /// Start loading a background image against the current canvas.
    pub fn request_background(&self, data_uri: String) -> BackgroundRequest {
        BackgroundRequest::new(self.canvas.token(), data_uri)
    }

    /// Apply a decoded background, unless its canvas has since been replaced.
    pub fn complete_background(
        &mut self,
        decoded: DecodedBackground,
    ) -> Result<BackgroundOutcome, EditorError> {
        if decoded.token != self.canvas.token() {
            log::debug!(
                "Discarding background decoded for canvas {} (current is {})",
                decoded.token,
                self.canvas.token()
            );
            return Ok(BackgroundOutcome::Discarded);
        }
        let image = decoded.result?;
        Ok(BackgroundOutcome::Installed(self.install_background(image)))
    }

    /// Decode and install a background image in one step.
    pub fn add_image_background(&mut self, data_uri: &str) -> Result<LayerId, EditorError> {
        let image = decode_data_uri(data_uri)?;
        Ok(self.install_background(image))
    }

    fn install_background(&mut self, image: DecodedImage) -> LayerId {
        log::debug!(
            "Installing {}x{} background",
            image.pixels.width(),
            image.pixels.height()
        );
        let id = LayerFactory::new(self.measure.as_ref())
            .add_image_background(&mut self.canvas, image);
        self.sync();
        id
    }

    /// Move a layer one step towards the front. No-op at the front.
    pub fn bring_forward(&mut self, id: LayerId) -> bool {
        let moved = self.canvas.bring_forward(id);
        self.sync();
        moved
    }

    /// Move a layer one step towards the back. No-op at the back.
    pub fn send_backward(&mut self, id: LayerId) -> bool {
        let moved = self.canvas.send_backward(id);
        self.sync();
        moved
    }

    /// Raise the active layer, if any.
    pub fn bring_active_forward(&mut self) -> bool {
        self.selection.active().is_some_and(|id| self.bring_forward(id))
    }

    /// Lower the active layer, if any.
    pub fn send_active_backward(&mut self) -> bool {
        self.selection.active().is_some_and(|id| self.send_backward(id))
    }

    /// Whether the delete control is enabled.
    pub fn can_delete(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Remove the active layer and clear the selection.
    pub fn delete_active(&mut self) -> Option<LayerId> {
        let id = self.selection.active()?;
        self.canvas.remove(id);
        self.selection.clear();
        self.sync();
        Some(id)
    }

    /// Switch format. The current canvas and all its layers are dropped and
    /// a new empty canvas takes its place.
    pub fn change_format(&mut self, format: Format) {
        let fresh = Canvas::new(format, self.config.background_color);
        let old = std::mem::replace(&mut self.canvas, fresh);
        log::info!(
            "Format changed {} -> {}; canvas {} replaced by {}",
            old.format(),
            format,
            old.token(),
            self.canvas.token()
        );
        drop(old);
        self.selection.clear();
        self.panel.clear();
        self.needs_redraw = true;
    }

    /// Select the frontmost layer at a canvas point.
    pub fn click(&mut self, point: Point) -> Option<LayerId> {
        let id = self.canvas.click(point);
        self.sync();
        id
    }

    /// Select a layer from the layers panel. Unknown IDs are ignored.
    pub fn select_layer(&mut self, id: LayerId) -> bool {
        let selected = self.canvas.select(id);
        self.sync();
        selected
    }

    /// Current layers panel rows, back to front.
    pub fn list_layers(&self) -> &[LayerEntry] {
        self.panel.entries()
    }

    /// ID of the panel row at `index`.
    pub fn layer_at_index(&self, index: usize) -> Option<LayerId> {
        self.panel.id_at(index)
    }

    pub fn active(&self) -> Option<LayerId> {
        self.selection.active()
    }

    /// Center the active layer horizontally on the canvas.
    pub fn align_horizontal_center(&mut self) -> bool {
        self.align(|canvas, bounds| {
            Vec2::new(canvas.centered_left(bounds.width()) - bounds.x0, 0.0)
        })
    }

    /// Center the active layer vertically on the canvas.
    pub fn align_vertical_center(&mut self) -> bool {
        self.align(|canvas, bounds| {
            Vec2::new(0.0, canvas.centered_top(bounds.height()) - bounds.y0)
        })
    }

    fn align(&mut self, offset: impl Fn(&Canvas, kurbo::Rect) -> Vec2) -> bool {
        let Some(id) = self.selection.active() else {
            return false;
        };
        let Some(bounds) = self.canvas.layer_bounds(id) else {
            return false;
        };
        let delta = offset(&self.canvas, bounds);
        let moved = self.canvas.move_layer(id, delta);
        self.sync();
        moved
    }

    /// Returns true once after anything visible changed.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Feed pending canvas events to the selection and the layers panel.
    fn sync(&mut self) {
        let events = self.canvas.take_events();
        if events.is_empty() {
            return;
        }
        for event in &events {
            self.selection.apply(event);
            if let SceneEvent::Selected(id) = event {
                log::debug!("Layer {id} selected");
            }
        }
        if events.iter().any(SceneEvent::is_structural) {
            self.panel.refresh(self.canvas.scene());
        }
        self.needs_redraw = true;
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        log::info!("Closing editor session on canvas {}", self.canvas.token());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerTrait;
    use crate::sample::parse_sample;
    use crate::test_support::png_data_uri;

    fn blank_editor(sample: SampleRow) -> Editor {
        Editor::new(sample, EditorConfig::default().without_sample())
    }

    fn order(editor: &Editor) -> Vec<LayerId> {
        editor.canvas().scene().z_order().to_vec()
    }

    #[test]
    fn test_new_session_draws_sample() {
        let editor = Editor::new(SampleRow::demo(), EditorConfig::default());
        assert_eq!(editor.dimensions(), (512, 384));
        assert_eq!(editor.list_layers().len(), 4);
        assert!(!editor.can_delete());
    }

    #[test]
    fn test_csv_scenario() {
        let sample = parse_sample("name,email\nJane Doe,jane@x.com").unwrap();
        let mut editor = Editor::new(sample, EditorConfig::default());
        let fields: Vec<_> = editor.available_fields().map(|(k, _)| k.to_string()).collect();
        assert_eq!(fields, vec!["name", "email"]);

        let id = editor.add_field("name").unwrap();
        let layer = editor.canvas().scene().get_layer(id).unwrap();
        assert_eq!(layer.text(), Some("Jane Doe"));
        assert!((layer.bounds().center().x - 256.0).abs() <= 1.0);
        assert_eq!(editor.list_layers().last().map(|e| e.label.as_str()), Some("Jane Doe"));
    }

    #[test]
    fn test_unknown_or_empty_field() {
        let sample = parse_sample("name,email\nJane Doe,").unwrap();
        let mut editor = blank_editor(sample);
        assert!(matches!(editor.add_field("email"), Err(EditorError::UnknownField(_))));
        assert!(matches!(editor.add_field("phone"), Err(EditorError::UnknownField(_))));
        assert!(editor.list_layers().is_empty());
    }

    #[test]
    fn test_bound_fields_round_trip_to_labels() {
        let sample = parse_sample("first,last,course,date\nJane,Doe,Rust 101,2024-05-01").unwrap();
        let mut editor = blank_editor(sample);
        let fields: Vec<_> = editor.available_fields().map(|(k, _)| k.to_string()).collect();
        for field in &fields {
            editor.add_field(field).unwrap();
        }
        let labels: Vec<_> = editor.list_layers().iter().map(|e| e.label.clone()).collect();
        assert_eq!(labels, vec!["Jane", "Doe", "Rust 101", "2024-05-01"]);
    }

    #[test]
    fn test_forward_then_backward_restores_order() {
        let mut editor = blank_editor(SampleRow::demo());
        let a = editor.add_text("a");
        editor.add_text("b");
        editor.add_text("c");
        let before = order(&editor);

        assert!(editor.bring_forward(a));
        assert!(editor.send_backward(a));
        assert_eq!(order(&editor), before);
    }

    #[test]
    fn test_reorder_boundaries_are_noops() {
        let mut editor = blank_editor(SampleRow::demo());
        let back = editor.add_text("back");
        let front = editor.add_text("front");
        let before = order(&editor);

        assert!(!editor.bring_forward(front));
        assert!(!editor.send_backward(back));
        assert_eq!(order(&editor), before);
    }

    #[test]
    fn test_reorder_refreshes_panel() {
        let mut editor = blank_editor(SampleRow::demo());
        let a = editor.add_text("a");
        editor.add_text("b");
        editor.bring_forward(a);
        let labels: Vec<_> = editor.list_layers().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let mut editor = Editor::new(SampleRow::demo(), EditorConfig::default());
        let before = order(&editor);
        assert!(!editor.can_delete());
        assert_eq!(editor.delete_active(), None);
        assert_eq!(order(&editor), before);
    }

    #[test]
    fn test_delete_active() {
        let mut editor = blank_editor(SampleRow::demo());
        let keep = editor.add_text("keep");
        let gone = editor.add_text("gone");
        assert!(editor.select_layer(gone));
        assert!(editor.can_delete());

        assert_eq!(editor.delete_active(), Some(gone));
        assert_eq!(editor.active(), None);
        assert_eq!(order(&editor), vec![keep]);
        assert_eq!(editor.list_layers().len(), 1);
    }

    #[test]
    fn test_active_controls() {
        let mut editor = blank_editor(SampleRow::demo());
        assert!(!editor.bring_active_forward());
        let a = editor.add_text("a");
        let b = editor.add_text("b");
        editor.select_layer(a);
        assert!(editor.bring_active_forward());
        assert_eq!(order(&editor), vec![b, a]);
        assert!(editor.send_active_backward());
        assert_eq!(order(&editor), vec![a, b]);
    }

    #[test]
    fn test_click_selects() {
        let mut editor = blank_editor(SampleRow::demo());
        let id = editor.add_text("Jane Doe");
        let center = editor.canvas().layer_bounds(id).unwrap().center();
        assert_eq!(editor.click(center), Some(id));
        assert_eq!(editor.active(), Some(id));
        assert_eq!(editor.click(Point::new(1.0, 1.0)), None);
        assert_eq!(editor.active(), Some(id));
    }

    #[test]
    fn test_select_deleted_layer_is_silent() {
        let mut editor = blank_editor(SampleRow::demo());
        let id = editor.add_text("x");
        editor.select_layer(id);
        editor.delete_active();
        assert!(!editor.select_layer(id));
        assert_eq!(editor.active(), None);
    }

    #[test]
    fn test_format_change_discards_layers() {
        let mut editor = Editor::new(SampleRow::demo(), EditorConfig::default());
        let id = editor.add_text("John Doe");
        editor.select_layer(id);
        assert_eq!(editor.dimensions(), (512, 384));

        editor.change_format(Format::Widescreen);

        assert_eq!(editor.dimensions(), (960, 540));
        assert!(editor.canvas().scene().is_empty());
        assert!(editor.list_layers().is_empty());
        assert_eq!(editor.active(), None);
    }

    #[test]
    fn test_background_install_and_replace() {
        let mut editor = blank_editor(SampleRow::demo());
        editor.add_text("a");
        let first = editor.add_image_background(&png_data_uri(10, 20)).unwrap();
        let second = editor.add_image_background(&png_data_uri(30, 5)).unwrap();
        assert_ne!(first, second);

        let bg = editor.canvas().scene().background().unwrap();
        assert_eq!(bg.id(), second);
        assert!((bg.width - 512.0).abs() < f64::EPSILON);
        assert!((bg.height - 384.0).abs() < f64::EPSILON);
        // The background is not a panel row.
        assert_eq!(editor.list_layers().len(), 1);
    }

    #[test]
    fn test_direct_background_lands_on_current_canvas() {
        let mut editor = blank_editor(SampleRow::demo());
        editor.change_format(Format::Widescreen);
        editor.take_redraw();

        let id = editor.add_image_background(&png_data_uri(4, 4)).unwrap();
        let bg = editor.canvas().scene().background().unwrap();
        assert_eq!(bg.id(), id);
        assert_eq!(bg.bounds(), kurbo::Rect::new(0.0, 0.0, 960.0, 540.0));
        assert!(editor.take_redraw());
    }

    #[test]
    fn test_stale_background_is_discarded() {
        let mut editor = blank_editor(SampleRow::demo());
        let request = editor.request_background(png_data_uri(8, 8));
        editor.change_format(Format::Square);

        let outcome = editor.complete_background(request.decode()).unwrap();
        assert_eq!(outcome, BackgroundOutcome::Discarded);
        assert!(editor.canvas().scene().background().is_none());
    }

    #[test]
    fn test_background_decode_failure_leaves_scene() {
        let mut editor = Editor::new(SampleRow::demo(), EditorConfig::default());
        let before = order(&editor);
        let result = editor.add_image_background("data:image/png;base64,bm90IGFuIGltYWdl");
        assert!(matches!(result, Err(EditorError::Image(_))));
        assert_eq!(order(&editor), before);
        assert!(editor.canvas().scene().background().is_none());
    }

    #[test]
    fn test_align_active() {
        let mut editor = blank_editor(SampleRow::demo());
        assert!(!editor.align_vertical_center());
        let id = editor.add_textbox("hello");
        editor.select_layer(id);
        assert!(editor.align_vertical_center());
        let bounds = editor.canvas().layer_bounds(id).unwrap();
        assert!((bounds.center().y - 192.0).abs() < 1e-9);
        assert!(editor.align_horizontal_center());
        assert!((editor.canvas().layer_bounds(id).unwrap().center().x - 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_redraw_flag() {
        let mut editor = blank_editor(SampleRow::demo());
        assert!(editor.take_redraw());
        assert!(!editor.take_redraw());
        let id = editor.add_text("x");
        assert!(editor.take_redraw());
        editor.select_layer(id);
        assert!(editor.take_redraw());
    }
}
