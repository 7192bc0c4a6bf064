//! Text measurement.

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.16;

/// Measures laid-out text.
///
/// Layer factories use this to center new layers; renderers provide an
/// implementation that agrees with the glyphs they actually draw.
pub trait TextMeasure {
    /// Advance width of a single line of text.
    fn line_width(&self, line: &str, font_size: f64) -> f64;

    /// Distance between consecutive baselines.
    fn line_height(&self, font_size: f64) -> f64 {
        font_size * LINE_HEIGHT
    }
}

/// Fixed-advance measure: every character is `advance_ratio * font_size` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub advance_ratio: f64,
}

impl MonospaceMeasure {
    pub const DEFAULT_ADVANCE_RATIO: f64 = 0.5;

    pub fn new(advance_ratio: f64) -> Self {
        Self { advance_ratio }
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADVANCE_RATIO)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn line_width(&self, line: &str, font_size: f64) -> f64 {
        line.chars().count() as f64 * font_size * self.advance_ratio
    }
}
