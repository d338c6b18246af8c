//! # Character Palettes
//!
//! Named glyph ramps and the brightness → glyph quantizer.
//!
//! Every ramp is ordered **dense → sparse → empty**: the first glyph covers
//! the most pixels and the last one is a space. Glyphs are drawn light on a
//! black surface, so bright cells pick dense glyphs.
//!
//! ```text
//! luma'   255 ─────────────────────────────── 0
//! glyph    @   %   #   *   +   =   -   :   .  ' '
//! ```
//!
//! ## Usage
//!
//! ```
//! use neuroglitch::palette::Ramp;
//!
//! let ramp = Ramp::resolve("standard");
//! assert_eq!(ramp.glyph_for(255.0), '@');
//! assert_eq!(ramp.glyph_for(0.0), ' ');
//! ```

use serde::Serialize;

use crate::error::GlitchError;

/// A named, statically defined glyph ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub name: &'static str,
    /// Glyphs ordered dense → sparse → empty.
    pub glyphs: &'static str,
}

/// Mimics the look of leaked cipher text.
pub const ENCRYPTION: Palette = Palette {
    name: "encryption",
    glyphs: "081LCGftli;:., ",
};

/// The classic 10-step ASCII ramp.
pub const STANDARD: Palette = Palette {
    name: "standard",
    glyphs: "@%#*+=-:. ",
};

/// 70-step ramp for fine tonal detail.
pub const COMPLEX: Palette = Palette {
    name: "complex",
    glyphs: "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ",
};

/// All registered palettes, in display order.
pub const PALETTES: &[Palette] = &[ENCRYPTION, STANDARD, COMPLEX];

/// Palette used when a name is not registered.
pub const FALLBACK: Palette = STANDARD;

/// Get a palette by name (case-insensitive).
pub fn by_name(name: &str) -> Option<Palette> {
    let name = name.trim();
    PALETTES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .copied()
}

/// Names of all registered palettes.
pub fn list_palettes() -> Vec<&'static str> {
    PALETTES.iter().map(|p| p.name).collect()
}

/// An ordered glyph ramp ready for per-cell lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ramp {
    glyphs: Vec<char>,
}

impl Ramp {
    /// Build a ramp from an arbitrary dense → empty glyph string.
    pub fn new(glyphs: &str) -> Result<Self, GlitchError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.is_empty() {
            return Err(GlitchError::invalid("glyph ramp must not be empty"));
        }
        Ok(Self { glyphs })
    }

    /// Ramp for a palette name, falling back to [`FALLBACK`] for unknown names.
    pub fn resolve(name: &str) -> Self {
        let palette = by_name(name).unwrap_or(FALLBACK);
        Self {
            glyphs: palette.glyphs.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Ramp index for a gamma-remapped brightness.
    ///
    /// `index = floor((1 - luma/255) * (len - 1))`, clamped to the ramp.
    /// Values on a bucket boundary fall toward the denser glyph.
    pub fn index_for(&self, luma: f32) -> usize {
        let last = self.glyphs.len().saturating_sub(1);
        let normalized = 1.0 - luma / 255.0;
        let index = (normalized * last as f32).floor();
        if index.is_nan() || index < 0.0 {
            0
        } else {
            (index as usize).min(last)
        }
    }

    /// Glyph for a gamma-remapped brightness.
    pub fn glyph_for(&self, luma: f32) -> char {
        self.glyphs[self.index_for(luma)]
    }
}

impl From<Palette> for Ramp {
    fn from(palette: Palette) -> Self {
        Self {
            glyphs: palette.glyphs.chars().collect(),
        }
    }
}

/// Whether a glyph leaves no ink and can be skipped.
#[inline]
pub fn is_blank(glyph: char) -> bool {
    glyph.is_whitespace()
}
