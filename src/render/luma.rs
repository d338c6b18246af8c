//! # Luminance Sampler
//!
//! Perceptual brightness per grid cell, followed by a gamma remap that
//! darkens midtones while keeping highlights apart:
//!
//! ```text
//! luma  = 0.299 r + 0.587 g + 0.114 b        (ITU-R BT.601)
//! luma' = 255 · (luma / 255)^1.2
//! ```
//!
//! Glyph density, color grading and particle eligibility all read `luma'`.

use image::RgbImage;

/// Exponent of the brightness remap.
pub const GAMMA: f32 = 1.2;

/// BT.601 luma of an RGB triple, in `[0, 255]`.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Gamma remap on the 0-255 scale.
#[inline]
pub fn gamma_remap(luma: f32) -> f32 {
    (luma / 255.0).clamp(0.0, 1.0).powf(GAMMA) * 255.0
}

/// Remapped brightness of an RGB triple.
#[inline]
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    gamma_remap(luma(r, g, b))
}

/// Sample `(r, g, b, luma')` from the working buffer.
#[inline]
pub fn sample(buffer: &RgbImage, x: u32, y: u32) -> ([u8; 3], f32) {
    let [r, g, b] = buffer.get_pixel(x, y).0;
    ([r, g, b], brightness(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_weights() {
        assert!((luma(255, 0, 0) - 76.245).abs() < 1e-3);
        assert!((luma(0, 255, 0) - 149.685).abs() < 1e-3);
        assert!((luma(0, 0, 255) - 29.07).abs() < 1e-3);
        assert!((luma(255, 255, 255) - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_gamma_endpoints() {
        assert_eq!(gamma_remap(0.0), 0.0);
        assert!((gamma_remap(255.0) - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_gamma_darkens_midtones() {
        let mid = gamma_remap(128.0);
        assert!(mid < 128.0);
        assert!((mid - 111.5).abs() < 0.5, "got {}", mid);
    }

    #[test]
    fn test_gamma_is_monotonic() {
        let mut previous = -1.0;
        for v in 0..=255 {
            let remapped = gamma_remap(v as f32);
            assert!(remapped >= previous);
            previous = remapped;
        }
    }

    #[test]
    fn test_sample_reads_pixel() {
        let buffer = RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        let (rgb, brightness) = sample(&buffer, 1, 1);
        assert_eq!(rgb, [255, 255, 255]);
        assert!((brightness - 255.0).abs() < 1e-3);
    }
}
