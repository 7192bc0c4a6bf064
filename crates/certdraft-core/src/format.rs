//! Canvas aspect-ratio formats.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown format tag.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown format '{0}', expected one of 1x1, 4x3, 16x9")]
pub struct FormatError(pub String);

/// The canvas formats a template can be laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Format {
    /// 1x1, 512x512.
    #[serde(rename = "1x1")]
    Square,
    /// 4x3, 512x384.
    #[default]
    #[serde(rename = "4x3")]
    Standard,
    /// 16x9, 960x540.
    #[serde(rename = "16x9")]
    Widescreen,
}

impl Format {
    /// Pixel dimensions (width, height).
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Format::Square => (512, 512),
            Format::Standard => (1024 / 2, 768 / 2),
            Format::Widescreen => (1920 / 2, 1080 / 2),
        }
    }

    /// Dimensions as a canvas size.
    pub fn size(self) -> Size {
        let (w, h) = self.dimensions();
        Size::new(w as f64, h as f64)
    }

    /// The tag shown in the format menu.
    pub fn tag(self) -> &'static str {
        match self {
            Format::Square => "1x1",
            Format::Standard => "4x3",
            Format::Widescreen => "16x9",
        }
    }

    /// Menu order.
    pub fn all() -> &'static [Format] {
        &[Format::Square, Format::Standard, Format::Widescreen]
    }
}

/// Map a format to its pixel dimensions.
pub fn select_format(format: Format) -> (u32, u32) {
    format.dimensions()
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::all()
            .iter()
            .copied()
            .find(|f| f.tag() == s.trim())
            .ok_or_else(|| FormatError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert_eq!(select_format(Format::Square), (512, 512));
        assert_eq!(select_format(Format::Standard), (512, 384));
        assert_eq!(select_format(Format::Widescreen), (960, 540));
    }

    #[test]
    fn test_default_is_four_by_three() {
        assert_eq!(Format::default(), Format::Standard);
    }

    #[test]
    fn test_parse_tags() {
        for &format in Format::all() {
            assert_eq!(format.tag().parse::<Format>(), Ok(format));
        }
        assert_eq!("3x2".parse::<Format>(), Err(FormatError("3x2".to_string())));
    }

    #[test]
    fn test_serde_uses_tags() {
        assert_eq!(serde_json::to_string(&Format::Widescreen).unwrap(), "\"16x9\"");
        let parsed: Format = serde_json::from_str("\"1x1\"").unwrap();
        assert_eq!(parsed, Format::Square);
    }
}
