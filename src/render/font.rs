//! Glyph bitmaps for the ASCII layer.
//!
//! Uses the Spleen bitmap font family. The closest Spleen size at or above
//! the requested glyph height is picked and scaled with nearest neighbor, so
//! small glyphs stay crisp.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};
use std::collections::HashMap;

/// A 1-bit glyph bitmap, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl GlyphBitmap {
    #[inline]
    pub fn is_on(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x]
    }

    /// Number of set pixels (ink coverage).
    pub fn coverage(&self) -> usize {
        self.data.iter().filter(|&&on| on).count()
    }
}

/// Cell box `(width, height)` for a glyph size in pixels.
///
/// Spleen glyphs are twice as tall as they are wide.
pub fn cell_size(glyph_size: u32) -> (usize, usize) {
    let height = glyph_size.max(1) as usize;
    ((height / 2).max(1), height)
}

fn source_font(glyph_size: u32) -> (&'static [u8], usize, usize) {
    match glyph_size {
        0..=12 => (FONT_6X12, 6, 12),
        13..=16 => (FONT_8X16, 8, 16),
        _ => (FONT_12X24, 12, 24),
    }
}

/// Rasterize one character at the given glyph size.
pub fn generate_glyph(ch: char, glyph_size: u32) -> GlyphBitmap {
    let (font_data, src_w, src_h) = source_font(glyph_size);
    let (width, height) = cell_size(glyph_size);
    let mut data = vec![false; width * height];

    let src_bitmap = PSF2Font::new(font_data).ok().and_then(|mut spleen| {
        let utf8_bytes = ch.to_string();
        spleen.glyph_for_utf8(utf8_bytes.as_bytes()).map(|glyph| {
            let mut bitmap = vec![false; src_w * src_h];
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < src_h && col_x < src_w {
                        bitmap[row_y * src_w + col_x] = on;
                    }
                }
            }
            bitmap
        })
    });

    match src_bitmap {
        Some(src) => scale_bitmap(&src, src_w, src_h, &mut data, width, height),
        // Unknown glyphs render as an outlined box
        None => draw_box(&mut data, width, height),
    }

    GlyphBitmap {
        width,
        height,
        data,
    }
}

/// Scale a bitmap from src dimensions to dst dimensions using nearest neighbor.
fn scale_bitmap(
    src: &[bool],
    src_w: usize,
    src_h: usize,
    dst: &mut [bool],
    dst_w: usize,
    dst_h: usize,
) {
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            let src_idx = sy * src_w + sx;
            let dst_idx = dy * dst_w + dx;
            if src_idx < src.len() && dst_idx < dst.len() {
                dst[dst_idx] = src[src_idx];
            }
        }
    }
}

/// Draw a box outline in the glyph buffer.
fn draw_box(glyph: &mut [bool], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = true;
        glyph[(height - 1) * width + x] = true;
    }
    for y in 0..height {
        glyph[y * width] = true;
        glyph[y * width + width - 1] = true;
    }
}

/// Pre-rasterized glyphs for one ramp at one size.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    glyph_size: u32,
    glyphs: HashMap<char, GlyphBitmap>,
}

impl GlyphAtlas {
    pub fn new(glyph_size: u32, chars: &[char]) -> Self {
        let glyphs = chars
            .iter()
            .filter(|ch| !ch.is_whitespace())
            .map(|&ch| (ch, generate_glyph(ch, glyph_size)))
            .collect();
        Self { glyph_size, glyphs }
    }

    pub fn glyph_size(&self) -> u32 {
        self.glyph_size
    }

    pub fn get(&self, ch: char) -> Option<&GlyphBitmap> {
        self.glyphs.get(&ch)
    }
}
