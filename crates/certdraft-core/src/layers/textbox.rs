//! Word-wrapped text box layer.

use super::{LayerId, LayerStyle, LayerTrait, MonospaceMeasure, TextMeasure};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Horizontal alignment of lines inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Fraction of the free space placed before a line.
    fn factor(self) -> f64 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => 0.5,
            TextAlign::Right => 1.0,
        }
    }
}

/// A text layer wrapped to a fixed box width.
///
/// A word wider than the box widens the box rather than being broken.
#[derive(Debug, Clone)]
pub struct TextboxLayer {
    pub(crate) id: LayerId,
    /// Top-left corner of the box.
    pub position: Point,
    content: String,
    font_size: f64,
    /// Requested box width.
    box_width: f64,
    pub align: TextAlign,
    pub style: LayerStyle,
    /// Wrapped lines with their measured widths.
    lines: Vec<(String, f64)>,
    /// Laid-out size; width may exceed `box_width` for long words.
    size: Size,
    line_height: f64,
}

impl TextboxLayer {
    /// Default wrap width for new text boxes.
    pub const DEFAULT_WIDTH: f64 = 200.0;

    /// Create a new text box, laid out with the default monospace measure.
    pub fn new(position: Point, content: String, box_width: f64) -> Self {
        let mut layer = Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: super::TextLayer::DEFAULT_FONT_SIZE,
            box_width,
            align: TextAlign::default(),
            style: LayerStyle::default(),
            lines: Vec::new(),
            size: Size::ZERO,
            line_height: 0.0,
        };
        layer.relayout(&MonospaceMeasure::default());
        layer
    }

    /// Set the font size. Call [`TextboxLayer::relayout`] afterwards.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    /// Wrap the content into lines using the given measure.
    pub fn relayout(&mut self, measure: &dyn TextMeasure) {
        let font_size = self.font_size;
        let widest_word = self
            .content
            .split_whitespace()
            .map(|word| measure.line_width(word, font_size))
            .fold(0.0, f64::max);
        let width = self.box_width.max(widest_word);

        let mut lines = Vec::new();
        for paragraph in self.content.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                if line.is_empty() {
                    line.push_str(word);
                    continue;
                }
                let candidate = format!("{line} {word}");
                if measure.line_width(&candidate, font_size) > width {
                    let finished = std::mem::replace(&mut line, word.to_string());
                    let w = measure.line_width(&finished, font_size);
                    lines.push((finished, w));
                } else {
                    line = candidate;
                }
            }
            let w = measure.line_width(&line, font_size);
            lines.push((line, w));
        }

        self.line_height = measure.line_height(font_size);
        self.size = Size::new(width, lines.len().max(1) as f64 * self.line_height);
        self.lines = lines;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Effective box width after layout.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn box_width(&self) -> f64 {
        self.box_width
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Wrapped lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(line, _)| line.as_str())
    }

    /// Wrapped lines with their x offset relative to the box, per alignment.
    pub fn aligned_lines(&self) -> impl Iterator<Item = (&str, f64)> {
        let factor = self.align.factor();
        let width = self.size.width;
        self.lines
            .iter()
            .map(move |(line, w)| (line.as_str(), (width - w).max(0.0) * factor))
    }
}

impl LayerTrait for TextboxLayer {
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
