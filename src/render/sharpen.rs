//! # Sharpen Filter
//!
//! A fixed 3×3 high-pass convolution that makes edges stand out before the
//! grid is sampled, so glyph density follows contours more closely.
//!
//! ```text
//!     0  -1   0
//!    -1   5  -1        out = 5·center − top − bottom − left − right
//!     0  -1   0
//! ```
//!
//! The kernel sums to 1, so flat regions pass through unchanged.
//!
//! ## Boundaries
//!
//! Only interior pixels are filtered. The outermost row and column on every
//! side keep their original values (no reflection, no clamping of
//! coordinates). Results saturate to `[0, 255]`.
//!
//! Neighbors are always read from a snapshot of the unfiltered buffer, which
//! also lets rows be filtered in parallel.

use image::RgbImage;
use rayon::prelude::*;

/// Sharpen an RGB buffer in place.
pub fn sharpen(buffer: &mut RgbImage) {
    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    if w < 3 || h < 3 {
        // No interior pixels
        return;
    }

    let snapshot = buffer.as_raw().clone();
    let stride = w * 3;

    buffer
        .par_chunks_mut(stride)
        .enumerate()
        .skip(1)
        .take(h - 2)
        .for_each(|(y, row_out)| {
            let row = y * stride;
            let above = row - stride;
            let below = row + stride;
            for x in 1..w - 1 {
                let px = x * 3;
                for c in 0..3 {
                    let center = snapshot[row + px + c] as i32;
                    let value = 5 * center
                        - snapshot[above + px + c] as i32
                        - snapshot[below + px + c] as i32
                        - snapshot[row + px - 3 + c] as i32
                        - snapshot[row + px + 3 + c] as i32;
                    row_out[px + c] = value.clamp(0, 255) as u8;
                }
            }
        });
}
