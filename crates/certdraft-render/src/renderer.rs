//! Renderer trait abstraction.

use certdraft_core::canvas::Canvas;
use certdraft_core::layers::LayerId;
use image::RgbaImage;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Largest output side, in device pixels.
pub const MAX_DIMENSION: u16 = 8192;

/// Context for a single render.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Device pixel ratio; output is `canvas size * scale_factor` pixels.
    pub scale_factor: f64,
    /// Layer to outline as selected, if any.
    pub selection: Option<LayerId>,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            scale_factor: 1.0,
            selection: None,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Outline a layer as selected.
    pub fn with_selection(mut self, selection: Option<LayerId>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Output size in device pixels.
    ///
    /// Fails when the scale is not a positive number or either side would
    /// exceed [`MAX_DIMENSION`].
    pub fn pixel_size(&self) -> RenderResult<(u16, u16)> {
        let scale = self.scale_factor;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RendererError::RenderFailed(format!("invalid scale factor {scale}")));
        }
        let size = self.canvas.size();
        let side = |len: f64| {
            let px = (len * scale).round().max(1.0);
            if px > f64::from(MAX_DIMENSION) {
                return Err(RendererError::RenderFailed(format!(
                    "{}x{} canvas at scale {scale} exceeds {MAX_DIMENSION} pixels per side",
                    size.width, size.height
                )));
            }
            Ok(px as u16)
        };
        Ok((side(size.width)?, side(size.height)?))
    }

    /// The canvas background color.
    pub fn background_color(&self) -> Color {
        self.canvas.background_color.into()
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Rasterize the canvas described by `ctx`.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RgbaImage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use certdraft_core::format::Format;

    #[test]
    fn test_pixel_size_scales() {
        let canvas = Canvas::new(Format::Standard, Canvas::DEFAULT_BACKGROUND);
        assert_eq!(RenderContext::new(&canvas).pixel_size().unwrap(), (512, 384));
        let retina = RenderContext::new(&canvas).with_scale_factor(2.0);
        assert_eq!(retina.pixel_size().unwrap(), (1024, 768));
    }

    #[test]
    fn test_pixel_size_rejects_oversized_output() {
        let canvas = Canvas::new(Format::Widescreen, Canvas::DEFAULT_BACKGROUND);
        let largest = RenderContext::new(&canvas).with_scale_factor(8.0);
        assert_eq!(largest.pixel_size().unwrap(), (7680, 4320));
        for scale in [9.0, 1000.0, f64::INFINITY, f64::NAN, 0.0, -1.0] {
            let ctx = RenderContext::new(&canvas).with_scale_factor(scale);
            assert!(ctx.pixel_size().is_err(), "scale {scale} accepted");
        }
    }
}
