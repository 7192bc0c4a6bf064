//! Flattened image export.

use std::fmt;
use std::str::FromStr;

use certdraft_core::canvas::Canvas;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::raster::RasterRenderer;
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};

/// Encoded output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl ExportFormat {
    /// Suggested download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image.jpg",
            ExportFormat::Png => "image.png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Jpeg => write!(f, "jpeg"),
            ExportFormat::Png => write!(f, "png"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RendererError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            other => Err(RendererError::RenderFailed(format!(
                "unsupported export format: {other}"
            ))),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Output multiplier, normally the display's device pixel ratio.
    pub scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 100,
            scale: 1.0,
        }
    }
}

impl ExportOptions {
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// An encoded image ready to be written out.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }
}

/// Flatten the canvas and encode it. No selection chrome is drawn.
///
/// Scales that are not positive, or that would make either side larger than
/// [`MAX_DIMENSION`](crate::renderer::MAX_DIMENSION), are rejected before
/// anything is allocated.
pub fn export_image(canvas: &Canvas, options: &ExportOptions) -> RenderResult<ExportedImage> {
    let ctx = RenderContext::new(canvas).with_scale_factor(options.scale);
    ctx.pixel_size()?;
    let pixels = RasterRenderer::new().render(&ctx)?;
    let (width, height) = pixels.dimensions();

    let mut bytes = Vec::new();
    match options.format {
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
            let quality = options.quality.clamp(1, 100);
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                pixels.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
    }

    log::info!("Exported {} {}x{} ({} bytes)", options.format, width, height, bytes.len());
    Ok(ExportedImage {
        format: options.format,
        width,
        height,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use certdraft_core::factory::LayerFactory;
    use certdraft_core::format::Format;
    use certdraft_core::layers::DecodedImage;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_square_exports_512_jpeg() {
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        let exported = export_image(&canvas, &ExportOptions::default()).unwrap();
        assert_eq!(exported.file_name(), "image.jpg");
        assert_eq!(&exported.bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&exported.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (512, 512));
    }

    #[test]
    fn test_retina_scale_doubles_size() {
        let canvas = Canvas::new(Format::Widescreen, Canvas::DEFAULT_BACKGROUND);
        let exported = export_image(&canvas, &ExportOptions::default().with_scale(2.0)).unwrap();
        assert_eq!((exported.width, exported.height), (1920, 1080));
    }

    #[test]
    fn test_background_in_png_export() {
        let measure = crate::font::glyph_measure();
        let mut canvas = Canvas::new(Format::Standard, Canvas::DEFAULT_BACKGROUND);
        let decoded = DecodedImage {
            format: None,
            pixels: RgbaImage::from_pixel(2, 3, Rgba([0, 0, 255, 255])),
        };
        LayerFactory::new(&measure).add_image_background(&mut canvas, decoded);

        let options = ExportOptions::default().with_format(ExportFormat::Png);
        let exported = export_image(&canvas, &options).unwrap();
        let decoded = image::load_from_memory(&exported.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (512, 384));
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(decoded.get_pixel(511, 383), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        assert!(export_image(&canvas, &ExportOptions::default().with_scale(0.0)).is_err());
    }

    #[test]
    fn test_huge_scale_rejected() {
        let canvas = Canvas::new(Format::Widescreen, Canvas::DEFAULT_BACKGROUND);
        let options = ExportOptions::default().with_scale(1000.0);
        let err = export_image(&canvas, &options).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("gif".parse::<ExportFormat>().is_err());
    }
}
