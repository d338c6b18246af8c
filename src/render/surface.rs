//! # Destination Surface
//!
//! The output raster and the only place pixels are written. Draw commands
//! are applied one at a time, in order, by a single writer.
//!
//! ## Blending
//!
//! | Primitive | Blend |
//! |-----------|-------|
//! | Glow halo | additive, saturating |
//! | Particle disc | source-over with anti-aliased edge |
//! | Glyph | opaque 1-bit stamp |
//!
//! A resize either fully succeeds (new black buffer) or leaves the previous
//! frame in place.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

use super::compose::{DrawCommand, Glow};
use super::font::{GlyphAtlas, GlyphBitmap, generate_glyph};
use crate::error::GlitchError;

/// Peak strength of the additive glow, relative to the light color.
pub const GLOW_STRENGTH: f32 = 0.6;

/// Mutable output raster, opaque RGB.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    image: RgbImage,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Resize to `width × height` and clear to opaque black.
    ///
    /// Memory is reserved fallibly; on failure the previous contents stay
    /// untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GlitchError> {
        let alloc_error = || GlitchError::SurfaceAllocation { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(alloc_error)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_error())?;
        data.resize(len, 0u8);

        self.image = RgbImage::from_raw(width, height, data).ok_or_else(alloc_error)?;
        Ok(())
    }

    /// Apply one draw command.
    pub fn apply(&mut self, command: &DrawCommand, atlas: &GlyphAtlas) {
        match command {
            DrawCommand::Particle {
                center,
                radius,
                fill,
                glow,
            } => {
                self.glow(*center, *radius, glow);
                self.fill_disc(*center, *radius, *fill);
            }
            DrawCommand::Glyph {
                center,
                glyph,
                size,
                color,
            } => {
                if glyph.is_whitespace() {
                    return;
                }
                // Commands sized differently from the atlas are rasterized here
                let uncached;
                let bitmap = match atlas.get(*glyph) {
                    Some(bitmap) if *size == atlas.glyph_size() => bitmap,
                    _ => {
                        uncached = generate_glyph(*glyph, *size);
                        &uncached
                    }
                };
                self.stamp(*center, bitmap, *color);
            }
        }
    }

    /// Apply a command list in order.
    pub fn apply_all(&mut self, commands: &[DrawCommand], atlas: &GlyphAtlas) {
        for command in commands {
            self.apply(command, atlas);
        }
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, GlitchError> {
        let mut png_bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| GlitchError::Encode(format!("PNG encoding failed: {}", e)))?;
        Ok(png_bytes)
    }

    /// Save as PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), GlitchError> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| GlitchError::Encode(format!("Failed to save PNG: {}", e)))
    }

    /// Opaque 1-bit stamp centered on `center`.
    fn stamp(&mut self, center: (f32, f32), bitmap: &GlyphBitmap, color: Rgb<u8>) {
        let left = center.0 as i64 - (bitmap.width / 2) as i64;
        let top = center.1 as i64 - (bitmap.height / 2) as i64;
        for gy in 0..bitmap.height {
            for gx in 0..bitmap.width {
                if bitmap.is_on(gx, gy) {
                    self.put(left + gx as i64, top + gy as i64, color);
                }
            }
        }
    }

    #[inline]
    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Pixel bounds `[x0, x1) × [y0, y1)` of a circle, clipped to the surface.
    fn bounds(&self, center: (f32, f32), extent: f32) -> (u32, u32, u32, u32) {
        let clip = |v: f32, max: u32| v.clamp(0.0, max as f32) as u32;
        (
            clip((center.0 - extent).floor(), self.width()),
            clip((center.1 - extent).floor(), self.height()),
            clip((center.0 + extent).ceil() + 1.0, self.width()),
            clip((center.1 + extent).ceil() + 1.0, self.height()),
        )
    }

    fn fill_disc(&mut self, center: (f32, f32), radius: f32, fill: Rgb<u8>) {
        let (x0, y0, x1, y1) = self.bounds(center, radius + 1.0);
        for py in y0..y1 {
            for px in x0..x1 {
                let d = distance(px, py, center);
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let pixel = self.image.get_pixel_mut(px, py);
                for c in 0..3 {
                    let dst = pixel[c] as f32;
                    let src = fill[c] as f32;
                    pixel[c] = (dst + (src - dst) * coverage).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    /// Additive halo: full strength inside the disc, Gaussian falloff
    /// (sigma = blur / 2) outside it.
    fn glow(&mut self, center: (f32, f32), radius: f32, glow: &Glow) {
        if glow.blur <= 0.0 {
            return;
        }
        let sigma = glow.blur / 2.0;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let (x0, y0, x1, y1) = self.bounds(center, radius + 3.0 * sigma);
        for py in y0..y1 {
            for px in x0..x1 {
                let outside = (distance(px, py, center) - radius).max(0.0);
                let falloff = (-(outside * outside) / two_sigma_sq).exp() * GLOW_STRENGTH;
                if falloff < 1.0 / 255.0 {
                    continue;
                }
                let pixel = self.image.get_pixel_mut(px, py);
                for c in 0..3 {
                    let add = glow.color[c] as f32 * falloff;
                    pixel[c] = (pixel[c] as f32 + add).round().min(255.0) as u8;
                }
            }
        }
    }
}

/// Distance from a pixel's center to a point.
#[inline]
fn distance(px: u32, py: u32, center: (f32, f32)) -> f32 {
    let dx = px as f32 + 0.5 - center.0;
    let dy = py as f32 + 0.5 - center.1;
    (dx * dx + dy * dy).sqrt()
}
