//! CertDraft Render Library
//!
//! Renderer abstraction, a CPU rasterizer using the Spleen bitmap font, and
//! JPEG/PNG export of the flattened canvas.

mod export;
mod font;
mod raster;
mod renderer;

pub use export::{ExportFormat, ExportOptions, ExportedImage, export_image};
pub use font::{Glyph, GlyphCache, glyph_measure};
pub use raster::RasterRenderer;
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
