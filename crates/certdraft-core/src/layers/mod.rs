//! Layer definitions for the certificate canvas.

mod background;
mod measure;
mod text;
mod textbox;

pub use background::{
    DecodedImage, ImageError, ImageFormat, ImageLayer, decode_data_uri, encode_data_uri,
};
pub use measure::{LINE_HEIGHT, MonospaceMeasure, TextMeasure};
pub use text::TextLayer;
pub use textbox::{TextAlign, TextboxLayer};

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// Label shown in the layers panel for layers without text.
pub const PLACEHOLDER_LABEL: &str = "?";

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Error parsing a `#rrggbb` / `#rgb` color string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a CSS-style hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let err = || ColorParseError(hex.to_string());
        if !digits.is_ascii() {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?, 255))
            }
            6 | 8 => {
                let a = if digits.len() == 8 { channel(&digits[6..8])? } else { 255 };
                Ok(Self::new(
                    channel(&digits[0..2])?,
                    channel(&digits[2..4])?,
                    channel(&digits[4..6])?,
                    a,
                ))
            }
            _ => Err(err()),
        }
    }

    /// Format as `#rrggbb`, appending alpha only when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by text layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Fill color of the glyphs.
    pub fill_color: SerializableColor,
}

impl LayerStyle {
    pub fn with_fill(fill_color: SerializableColor) -> Self {
        Self { fill_color }
    }

    /// Glyph paint color.
    pub fn fill(&self) -> Color {
        self.fill_color.into()
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::with_fill(SerializableColor::black())
    }
}

/// Common trait for all layers.
pub trait LayerTrait {
    /// Get the unique identifier.
    fn id(&self) -> LayerId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in canvas coordinates) hits this layer.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Text shown in the layers panel, if any.
    fn text(&self) -> Option<&str>;

    /// Move the layer by an offset.
    fn translate(&mut self, offset: Vec2);
}

/// Enum wrapper for all layer types.
#[derive(Debug, Clone)]
pub enum Layer {
    Text(TextLayer),
    Textbox(TextboxLayer),
    Image(ImageLayer),
}

impl Layer {
    pub fn id(&self) -> LayerId {
        match self {
            Layer::Text(l) => l.id(),
            Layer::Textbox(l) => l.id(),
            Layer::Image(l) => l.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Layer::Text(l) => l.bounds(),
            Layer::Textbox(l) => l.bounds(),
            Layer::Image(l) => l.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Layer::Text(l) => l.hit_test(point, tolerance),
            Layer::Textbox(l) => l.hit_test(point, tolerance),
            Layer::Image(l) => l.hit_test(point, tolerance),
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        match self {
            Layer::Text(l) => l.translate(offset),
            Layer::Textbox(l) => l.translate(offset),
            Layer::Image(l) => l.translate(offset),
        }
    }

    /// Text content, `None` for layers that carry no text.
    pub fn text(&self) -> Option<&str> {
        match self {
            Layer::Text(l) => l.text(),
            Layer::Textbox(l) => l.text(),
            Layer::Image(l) => l.text(),
        }
    }

    /// Label for the layers panel: the text, or a placeholder glyph.
    pub fn label(&self) -> String {
        match self.text() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => PLACEHOLDER_LABEL.to_string(),
        }
    }

    /// Short name of the layer kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Text(_) => "text",
            Layer::Textbox(_) => "textbox",
            Layer::Image(_) => "image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let hex = SerializableColor::from_hex;
        assert_eq!(hex("#333"), Ok(SerializableColor::new(51, 51, 51, 255)));
        assert_eq!(hex("#aeaeae"), Ok(SerializableColor::new(174, 174, 174, 255)));
        assert_eq!(hex("00000080"), Ok(SerializableColor::new(0, 0, 0, 128)));
        assert!(SerializableColor::from_hex("#12345").is_err());
        assert!(SerializableColor::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_color_hex_round_trip() {
        let color = SerializableColor::from_hex("#aeaeae").unwrap();
        assert_eq!(color.to_hex(), "#aeaeae");
    }

    #[test]
    fn test_label_placeholder() {
        let text = TextLayer::new(Point::ZERO, String::new());
        assert_eq!(Layer::Text(text).label(), PLACEHOLDER_LABEL);

        let text = TextLayer::new(Point::ZERO, "Jane Doe".to_string());
        assert_eq!(Layer::Text(text).label(), "Jane Doe");
    }

    #[test]
    fn test_style_fill_keeps_alpha() {
        let style = LayerStyle::with_fill(SerializableColor::new(10, 20, 30, 128));
        let rgba = style.fill().to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b, rgba.a), (10, 20, 30, 128));
    }
}
