//! # Resampler
//!
//! Bounds the working resolution. Large photos are scaled down so their
//! width fits `max_width`; small ones are kept as-is (never upscaled).
//!
//! ```text
//! scale = min(1, max_width / W)
//! w     = floor(W * scale)
//! h     = floor(H * scale)
//! ```

use image::{DynamicImage, RgbImage, imageops::FilterType};

/// Working dimensions for a `width × height` source.
///
/// Returns `(0, 0)` when either source dimension is zero.
pub fn working_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let scale = (max_width as f64 / width as f64).min(1.0);
    let w = (width as f64 * scale).floor() as u32;
    let h = (height as f64 * scale).floor() as u32;
    (w, h)
}

/// Produce the opaque RGB working buffer for a source image.
///
/// Alpha is dropped. The filter choice only affects softness, so the cheap
/// triangle filter is used.
pub fn resample(source: &DynamicImage, max_width: u32) -> RgbImage {
    let (w, h) = working_dimensions(source.width(), source.height(), max_width);
    if w == 0 || h == 0 {
        return RgbImage::new(0, 0);
    }
    if w == source.width() && h == source.height() {
        return source.to_rgb8();
    }
    image::imageops::resize(&source.to_rgb8(), w, h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbaImage};

    #[test]
    fn test_never_upscales() {
        assert_eq!(working_dimensions(640, 480, 1200), (640, 480));
    }

    #[test]
    fn test_downscale_preserves_aspect() {
        assert_eq!(working_dimensions(2400, 1600, 1200), (1200, 800));
        // floor on both axes
        assert_eq!(working_dimensions(1999, 1001, 1200), (1200, 600));
    }

    #[test]
    fn test_zero_area() {
        assert_eq!(working_dimensions(0, 100, 1200), (0, 0));
        assert_eq!(working_dimensions(100, 0, 1200), (0, 0));
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let buffer = resample(&empty, 1200);
        assert_eq!(buffer.dimensions(), (0, 0));
    }

    #[test]
    fn test_resample_exact_size() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 150, Rgb([10, 20, 30])));
        let buffer = resample(&source, 100);
        assert_eq!(buffer.dimensions(), (100, 50));
    }

    #[test]
    fn test_alpha_is_dropped() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([200, 100, 50, 0]),
        ));
        let buffer = resample(&source, 1200);
        assert_eq!(buffer.get_pixel(1, 1), &Rgb([200, 100, 50]));
    }
}
