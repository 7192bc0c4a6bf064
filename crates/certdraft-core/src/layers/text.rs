//! Plain (non-wrapping) text layer.

use super::{LayerId, LayerStyle, LayerTrait, MonospaceMeasure, TextMeasure};
use kurbo::{Point, Rect, Size, Vec2};
use uuid::Uuid;

/// A single- or multi-line text layer that never wraps.
#[derive(Debug, Clone)]
pub struct TextLayer {
    pub(crate) id: LayerId,
    /// Position (top-left corner of text bounding box).
    pub position: Point,
    /// The text content.
    content: String,
    /// Font size in pixels.
    font_size: f64,
    /// Style properties.
    pub style: LayerStyle,
    /// Laid-out size, refreshed by [`TextLayer::relayout`].
    size: Size,
    line_height: f64,
}

impl TextLayer {
    /// Default font size for new text layers.
    pub const DEFAULT_FONT_SIZE: f64 = 36.0;

    /// Create a new text layer, laid out with the default monospace measure.
    pub fn new(position: Point, content: String) -> Self {
        let mut layer = Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: LayerStyle::default(),
            size: Size::ZERO,
            line_height: 0.0,
        };
        layer.relayout(&MonospaceMeasure::default());
        layer
    }

    /// Set the font size. Call [`TextLayer::relayout`] afterwards.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    /// Recompute the bounding size with the given measure.
    pub fn relayout(&mut self, measure: &dyn TextMeasure) {
        let width = self
            .lines()
            .map(|line| measure.line_width(line, self.font_size))
            .fold(0.0, f64::max);
        self.line_height = measure.line_height(self.font_size);
        let height = self.lines().count().max(1) as f64 * self.line_height;
        self.size = Size::new(width, height);
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Laid-out width.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Lines split on explicit newlines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

impl LayerTrait for TextLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = TextLayer::new(Point::new(100.0, 100.0), "Hello".to_string());
        assert_eq!(text.content(), "Hello");
        assert!((text.font_size() - TextLayer::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_width_follows_longest_line() {
        let measure = MonospaceMeasure::new(1.0);
        let mut text =
            TextLayer::new(Point::ZERO, "ab\nabcd\nabc".to_string()).with_font_size(10.0);
        text.relayout(&measure);
        assert!((text.width() - 40.0).abs() < f64::EPSILON);
        assert!((text.size().height - 3.0 * 10.0 * super::super::LINE_HEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test() {
        let text = TextLayer::new(Point::new(100.0, 100.0), "Hello World".to_string());
        let center = text.bounds().center();
        assert!(text.hit_test(center, 0.0));
        assert!(!text.hit_test(Point::new(0.0, 0.0), 0.0));
    }
}
