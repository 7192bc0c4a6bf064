//! Background image layer and data URI decoding.

use super::{LayerId, LayerTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbaImage;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Image decoding errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Not a base64 data URI")]
    InvalidDataUri,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image has no pixels")]
    Empty,
    #[error("Failed to read image: {0}")]
    Read(#[from] std::io::Error),
}

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Encode raw file bytes as a `data:` URI, the way a file reader would.
pub fn encode_data_uri(data: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(data)
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

/// A decoded bitmap ready to be installed as a background.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: Option<ImageFormat>,
    pub pixels: RgbaImage,
}

/// Decode a `data:<mime>;base64,<payload>` URI into RGBA pixels.
pub fn decode_data_uri(uri: &str) -> Result<DecodedImage, ImageError> {
    let rest = uri.trim().strip_prefix("data:").ok_or(ImageError::InvalidDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::InvalidDataUri)?;
    if !meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(ImageError::InvalidDataUri);
    }
    let bytes = STANDARD.decode(payload.trim())?;
    let format = ImageFormat::from_magic_bytes(&bytes);
    let pixels = image::load_from_memory(&bytes)?.to_rgba8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(ImageError::Empty);
    }
    Ok(DecodedImage { format, pixels })
}

/// A raster image stretched over the whole canvas.
///
/// Each axis is scaled independently, so the source aspect ratio is not kept.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub(crate) id: LayerId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Detected source format.
    pub format: Option<ImageFormat>,
    /// Decoded pixels, shared between clones.
    pixels: Arc<RgbaImage>,
}

impl ImageLayer {
    /// Create a background layer covering a canvas of the given size.
    pub fn covering(decoded: DecodedImage, canvas: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            position: Point::ZERO,
            width: canvas.width,
            height: canvas.height,
            format: decoded.format,
            pixels: Arc::new(decoded.pixels),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn source_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn source_height(&self) -> u32 {
        self.pixels.height()
    }

    /// Horizontal scale from source pixels to canvas pixels.
    pub fn scale_x(&self) -> f64 {
        self.width / self.source_width() as f64
    }

    /// Vertical scale from source pixels to canvas pixels.
    pub fn scale_y(&self) -> f64 {
        self.height / self.source_height() as f64
    }
}

impl LayerTrait for ImageLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    fn text(&self) -> Option<&str> {
        None
    }

    fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_data_uri;

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_magic_bytes(b"\x89PNG\r\n"), Some(ImageFormat::Png));
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ImageFormat::from_magic_bytes(&jpeg), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(&[0x00]), None);
    }

    #[test]
    fn test_decode_png_data_uri() {
        let uri = png_data_uri(4, 2);
        assert!(uri.starts_with("data:image/png;base64,"));
        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded.format, Some(ImageFormat::Png));
        assert_eq!(decoded.pixels.dimensions(), (4, 2));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_data_uri("not a uri"), Err(ImageError::InvalidDataUri)));
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(ImageError::InvalidDataUri)
        ));
        assert!(matches!(decode_data_uri("data:image/png;base64,!!!"), Err(ImageError::Base64(_))));
        let junk = format!("data:image/png;base64,{}", STANDARD.encode(b"definitely not pixels"));
        assert!(matches!(decode_data_uri(&junk), Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_covering_stretches_each_axis() {
        let decoded = decode_data_uri(&png_data_uri(100, 100)).unwrap();
        let layer = ImageLayer::covering(decoded, Size::new(960.0, 540.0));
        assert!((layer.scale_x() - 9.6).abs() < 1e-9);
        assert!((layer.scale_y() - 5.4).abs() < 1e-9);
        assert_eq!(layer.bounds(), Rect::new(0.0, 0.0, 960.0, 540.0));
        assert_eq!(layer.text(), None);
    }
}
