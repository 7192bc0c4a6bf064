//! CPU rasterizer: paints a canvas into an RGBA pixel buffer with `vello_cpu`.

use certdraft_core::layers::{ImageLayer, Layer, TextMeasure};
use image::RgbaImage;
use peniko::{Blob, ImageAlphaType, ImageData, ImageFormat, ImageSampler};
use vello_cpu::kurbo::{Affine, BezPath, Point, Rect, Shape, Stroke};
use vello_cpu::{Image, ImageSource, Pixmap, RenderContext as CpuContext};

use crate::font::{CELL_HEIGHT, CELL_WIDTH, Glyph, GlyphCache, glyph_measure};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};

/// Selection outline width in canvas units, drawn just outside the layer.
const SELECTION_STROKE: f64 = 2.0;

/// Software renderer backed by the Spleen bitmap font.
#[derive(Debug, Default)]
pub struct RasterRenderer {
    glyphs: GlyphCache,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the background image stretched over its rect.
    fn draw_background(&self, cpu: &mut CpuContext, image: &ImageLayer, base: Affine) {
        let pixels = image.pixels();
        let data = ImageData {
            data: Blob::from(pixels.as_raw().clone()),
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width: pixels.width(),
            height: pixels.height(),
        };
        let paint = Image {
            image: ImageSource::from_peniko_image_data(&data),
            sampler: ImageSampler::default(),
        };

        cpu.set_transform(
            base * Affine::translate((image.position.x, image.position.y))
                * Affine::scale_non_uniform(image.scale_x(), image.scale_y()),
        );
        cpu.set_paint(paint);
        cpu.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(image.source_width()),
            f64::from(image.source_height()),
        ));
        cpu.set_transform(base);
    }

    /// Fill one line of glyph cells starting at `origin` (canvas units).
    ///
    /// Set font pixels are merged into horizontal runs and filled as a
    /// single path, so neighbouring runs don't leave seams.
    fn draw_line(
        &mut self,
        cpu: &mut CpuContext,
        line: &str,
        origin: Point,
        font_size: f64,
    ) -> RenderResult<()> {
        let advance = glyph_measure().line_width("x", font_size);
        let (dot_w, dot_h) = (advance / CELL_WIDTH as f64, font_size / CELL_HEIGHT as f64);
        let mut path = BezPath::new();
        for (i, ch) in line.chars().enumerate() {
            let glyph = self.glyphs.glyph(ch)?;
            if glyph.is_blank() {
                continue;
            }
            let cell = Point::new(origin.x + i as f64 * advance, origin.y);
            for (row, start, end) in glyph_runs(glyph) {
                let run = Rect::new(
                    cell.x + start as f64 * dot_w,
                    cell.y + row as f64 * dot_h,
                    cell.x + end as f64 * dot_w,
                    cell.y + (row + 1) as f64 * dot_h,
                );
                path.extend(run.path_elements(0.1));
            }
        }
        if !path.elements().is_empty() {
            cpu.fill_path(&path);
        }
        Ok(())
    }

    fn draw_layer(
        &mut self,
        cpu: &mut CpuContext,
        layer: &Layer,
        base: Affine,
    ) -> RenderResult<()> {
        match layer {
            Layer::Text(text) => {
                cpu.set_paint(text.style.fill());
                let (font_size, line_height) = (text.font_size(), text.line_height());
                for (row, line) in text.lines().enumerate() {
                    let origin = glyph_origin(text.position, 0.0, row, font_size, line_height);
                    self.draw_line(cpu, line, origin, font_size)?;
                }
            }
            Layer::Textbox(textbox) => {
                cpu.set_paint(textbox.style.fill());
                let (font_size, line_height) = (textbox.font_size(), textbox.line_height());
                for (row, (line, offset)) in textbox.aligned_lines().enumerate() {
                    let origin =
                        glyph_origin(textbox.position, offset, row, font_size, line_height);
                    self.draw_line(cpu, line, origin, font_size)?;
                }
            }
            // Backgrounds are painted before the z-ordered layers.
            Layer::Image(image) => self.draw_background(cpu, image, base),
        }
        Ok(())
    }
}

impl Renderer for RasterRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RgbaImage> {
        let (width, height) = ctx.pixel_size()?;
        let mut cpu = CpuContext::new(width, height);
        let base = Affine::scale(ctx.scale_factor);
        cpu.set_transform(base);

        let size = ctx.canvas.size();
        cpu.set_paint(ctx.background_color());
        cpu.fill_rect(&Rect::new(0.0, 0.0, size.width, size.height));

        let scene = ctx.canvas.scene();
        if let Some(image) = scene.background() {
            self.draw_background(&mut cpu, image, base);
        }
        for layer in scene.layers_ordered() {
            self.draw_layer(&mut cpu, layer, base)?;
        }
        if let Some(bounds) = ctx.selection.and_then(|id| ctx.canvas.layer_bounds(id)) {
            let inset = SELECTION_STROKE / 2.0;
            let outline =
                Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y1).inflate(inset, inset);
            cpu.set_stroke(Stroke::new(SELECTION_STROKE));
            cpu.set_paint(ctx.selection_color);
            cpu.stroke_rect(&outline);
        }

        cpu.flush();
        let mut pixmap = Pixmap::new(width, height);
        cpu.render_to_pixmap(&mut pixmap);
        let bytes: Vec<u8> = pixmap
            .take_unpremultiplied()
            .into_iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect();

        log::debug!(
            "Rendered canvas {} ({} layers) at {}x{}",
            ctx.canvas.token(),
            scene.len(),
            width,
            height
        );
        RgbaImage::from_raw(u32::from(width), u32::from(height), bytes).ok_or_else(|| {
            RendererError::RenderFailed(format!("pixmap does not fill {width}x{height}"))
        })
    }
}

/// Top-left of the glyph cells for line `row`, centered vertically in the line box.
fn glyph_origin(
    position: kurbo::Point,
    offset: f64,
    row: usize,
    font_size: f64,
    line_height: f64,
) -> Point {
    Point::new(
        position.x + offset,
        position.y + row as f64 * line_height + (line_height - font_size) / 2.0,
    )
}

/// Horizontal runs of set font pixels as `(row, start, end)`, `end` exclusive.
fn glyph_runs(glyph: &Glyph) -> Vec<(usize, usize, usize)> {
    let mut runs = Vec::new();
    for row in 0..CELL_HEIGHT {
        let mut start = None;
        for x in 0..=CELL_WIDTH {
            match (glyph.get(x, row), start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((row, s, x));
                    start = None;
                }
                _ => {}
            }
        }
    }
    runs
}
