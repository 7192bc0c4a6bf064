//! Bitmap glyphs from the embedded Spleen 12x24 font.

use std::collections::HashMap;

use certdraft_core::layers::MonospaceMeasure;
use spleen_font::{FONT_12X24, PSF2Font};

use crate::renderer::{RenderResult, RendererError};

/// Glyph cell width in font pixels.
pub const CELL_WIDTH: usize = 12;
/// Glyph cell height in font pixels.
pub const CELL_HEIGHT: usize = 24;

/// A 12x24 on/off bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    bits: Vec<bool>,
}

impl Glyph {
    fn blank() -> Self {
        Self {
            bits: vec![false; CELL_WIDTH * CELL_HEIGHT],
        }
    }

    /// Hollow rectangle used for characters the font doesn't cover.
    pub(crate) fn missing() -> Self {
        let mut glyph = Self::blank();
        for x in 1..CELL_WIDTH - 1 {
            glyph.set(x, 4, true);
            glyph.set(x, CELL_HEIGHT - 4, true);
        }
        for y in 4..=CELL_HEIGHT - 4 {
            glyph.set(1, y, true);
            glyph.set(CELL_WIDTH - 2, y, true);
        }
        glyph
    }

    fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < CELL_WIDTH && y < CELL_HEIGHT {
            self.bits[y * CELL_WIDTH + x] = on;
        }
    }

    /// Whether the font pixel at (x, y) is set. Out of range reads are off.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < CELL_WIDTH && y < CELL_HEIGHT && self.bits[y * CELL_WIDTH + x]
    }

    pub fn is_blank(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }
}

/// Lazily filled glyph lookup.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<char, Glyph>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the glyph for `ch`, rasterizing it from the font on first use.
    pub fn glyph(&mut self, ch: char) -> RenderResult<&Glyph> {
        if !self.glyphs.contains_key(&ch) {
            let glyph = load_glyph(ch)?;
            self.glyphs.insert(ch, glyph);
        }
        self.glyphs
            .get(&ch)
            .ok_or_else(|| RendererError::RenderFailed(format!("glyph cache miss for {ch:?}")))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

fn load_glyph(ch: char) -> RenderResult<Glyph> {
    if ch == ' ' {
        return Ok(Glyph::blank());
    }
    let mut spleen = PSF2Font::new(FONT_12X24)
        .map_err(|e| RendererError::InitFailed(format!("spleen font: {e:?}")))?;
    let utf8 = ch.to_string();
    let Some(rows) = spleen.glyph_for_utf8(utf8.as_bytes()) else {
        log::debug!("No glyph for {ch:?}, drawing box");
        return Ok(Glyph::missing());
    };
    let mut glyph = Glyph::blank();
    for (y, row) in rows.enumerate() {
        for (x, on) in row.enumerate() {
            glyph.set(x, y, on);
        }
    }
    Ok(glyph)
}

/// Measure matching the glyph cell proportions, so layout and raster agree.
pub fn glyph_measure() -> MonospaceMeasure {
    MonospaceMeasure::new(CELL_WIDTH as f64 / CELL_HEIGHT as f64)
}
