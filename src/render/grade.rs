//! # Color Grader
//!
//! Maps a cell's sampled color and remapped brightness to the fill used for
//! its glyph and particle.
//!
//! ## Spectral bands
//!
//! | luma'      | color                          |
//! |------------|--------------------------------|
//! | > 235      | white                          |
//! | 181 – 235  | `(255, (b − 100)·1.5, 80)` gold |
//! | 131 – 180  | `(80, 255, b − 50)` green/cyan |
//! | 81 – 130   | `(0, b + 50, 220)` cyan/blue   |
//! | ≤ 80       | `(0, 40, b·1.2 + 40)` deep blue |
//!
//! ## Cyber bands
//!
//! | luma'      | color            |
//! |------------|------------------|
//! | > 180      | `(b, b, 255)`    |
//! | 101 – 180  | `(0, b, b)`      |
//! | ≤ 100      | `(b, 0, b)`      |

use image::Rgb;

use crate::settings::ColorMode;

/// Saturation boost applied in [`ColorMode::Original`].
pub const ORIGINAL_BOOST: f32 = 1.3;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Fill color for a cell.
pub fn grade(mode: ColorMode, rgb: [u8; 3], brightness: f32) -> Rgb<u8> {
    match mode {
        ColorMode::Mono => WHITE,
        ColorMode::Original => {
            let [r, g, b] = rgb;
            Rgb([boost(r), boost(g), boost(b)])
        }
        ColorMode::Spectral => spectral(brightness),
        ColorMode::Cyber => cyber(brightness),
    }
}

fn spectral(b: f32) -> Rgb<u8> {
    if b > 235.0 {
        WHITE
    } else if b > 180.0 {
        Rgb([255, channel((b - 100.0) * 1.5), 80])
    } else if b > 130.0 {
        Rgb([80, 255, channel(b - 50.0)])
    } else if b > 80.0 {
        Rgb([0, channel(b + 50.0), 220])
    } else {
        Rgb([0, 40, channel(b * 1.2 + 40.0)])
    }
}

fn cyber(b: f32) -> Rgb<u8> {
    let v = channel(b);
    if b > 180.0 {
        Rgb([v, v, 255])
    } else if b > 100.0 {
        Rgb([0, v, v])
    } else {
        Rgb([v, 0, v])
    }
}

/// Boosted channel.
#[inline]
fn boost(value: u8) -> u8 {
    channel(value as f32 * ORIGINAL_BOOST)
}

/// Round half away from zero and saturate. Every mode goes through here.
#[inline]
fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
