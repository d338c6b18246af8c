//! Source image acquisition.
//!
//! Turns uploaded bytes or a file path into a [`DynamicImage`]. Common
//! formats go through the `image` crate; HEIC/HEIF needs the `heif` feature
//! (system libheif).

use image::DynamicImage;
use std::path::Path;

use crate::error::GlitchError;

/// Decode an in-memory image. `filename` is only used as a format hint.
pub fn decode_bytes(data: &[u8], filename: &str) -> Result<DynamicImage, GlitchError> {
    if is_heic(data) || has_heif_extension(filename) {
        return decode_heic(data);
    }
    image::load_from_memory(data)
        .map_err(|e| GlitchError::Image(format!("Failed to decode image: {}", e)))
}

/// Read and decode an image file.
pub fn load_path(path: &Path) -> Result<DynamicImage, GlitchError> {
    let data = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    decode_bytes(&data, filename)
}

fn has_heif_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".heic") || lower.ends_with(".heif")
}

/// Check if the data looks like a HEIC/HEIF file by examining magic bytes.
///
/// HEIC files carry an `ftyp` box at offset 4 followed by a HEIF brand.
pub fn is_heic(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }
    matches!(
        &data[8..12],
        b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" | b"hevm" | b"hevs" | b"mif1"
            | b"msf1"
    )
}

#[cfg(feature = "heif")]
fn decode_heic(data: &[u8]) -> Result<DynamicImage, GlitchError> {
    use image::{Rgb, RgbImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heic_error = |e: libheif_rs::HeifError| GlitchError::Image(format!("HEIC: {}", e));

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(heic_error)?;
    let handle = ctx.primary_image_handle().map_err(heic_error)?;
    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(heic_error)?;

    let planes = image.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| GlitchError::Image("No interleaved RGB data in HEIC".to_string()))?;

    let (width, height) = (image.width(), image.height());
    let stride = interleaved.stride;
    let data = interleaved.data;

    let mut rgb_image = RgbImage::new(width, height);
    for (x, y, pixel) in rgb_image.enumerate_pixels_mut() {
        let offset = y as usize * stride + x as usize * 3;
        if let Some(rgb) = data.get(offset..offset + 3) {
            *pixel = Rgb([rgb[0], rgb[1], rgb[2]]);
        }
    }
    Ok(DynamicImage::ImageRgb8(rgb_image))
}

#[cfg(not(feature = "heif"))]
fn decode_heic(_data: &[u8]) -> Result<DynamicImage, GlitchError> {
    Err(GlitchError::Image(
        "HEIC/HEIF support is not enabled (build with --features heif)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let img = decode_bytes(&png_bytes(5, 3), "photo.png").unwrap();
        assert_eq!((img.width(), img.height()), (5, 3));
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_decode_garbage_is_image_error() {
        let err = decode_bytes(b"definitely not an image", "x.png").unwrap_err();
        assert!(matches!(err, GlitchError::Image(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_is_heic() {
        let mut header = vec![0, 0, 0, 24];
        header.extend_from_slice(b"ftypheic");
        assert!(is_heic(&header));
        assert!(!is_heic(&png_bytes(1, 1)));
        assert!(!is_heic(b"short"));
    }

    #[test]
    fn test_heif_extension() {
        assert!(has_heif_extension("IMG_0001.HEIC"));
        assert!(has_heif_extension("a.heif"));
        assert!(!has_heif_extension("a.jpg"));
    }

    #[test]
    fn test_load_missing_path_is_io_error() {
        let err = load_path(Path::new("/nonexistent/neuroglitch.png")).unwrap_err();
        assert!(matches!(err, GlitchError::Io(_)));
    }
}
