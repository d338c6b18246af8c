//! # Particle Overlay
//!
//! Glowing discs scattered over highlights. A cell is eligible when its
//! remapped brightness exceeds the particle ceiling; how far it exceeds it
//! drives both the spawn chance and the disc size:
//!
//! ```text
//! factor = (luma' − ceiling) / (255 − ceiling)          ∈ (0, 1]
//! chance = min(1, base% / 100 + factor · 0.5)
//! radius = (grid_step / 3) · (0.8 + factor)
//! ```
//!
//! A ceiling of 255 or more leaves nothing eligible (and avoids the division
//! by zero). Each cell rolls independently against the supplied RNG.

use rand::Rng;

use crate::settings::ProcessSettings;

/// Blur radius of the glow around every particle, in pixels.
pub const GLOW_BLUR: f32 = 10.0;

/// How much the brightness excess adds to the spawn chance.
pub const BRIGHTNESS_WEIGHT: f32 = 0.5;

/// Above this brightness a drawn particle replaces the cell's glyph.
pub const GLYPH_SUPPRESS_BRIGHTNESS: f32 = 230.0;

/// Eligibility and probability rule derived from one settings record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRule {
    ceiling: f32,
    base_chance: f32,
}

impl ParticleRule {
    pub fn new(settings: &ProcessSettings) -> Self {
        Self {
            ceiling: settings.particle_ceiling,
            base_chance: settings.particle_probability / 100.0,
        }
    }

    /// Whether the ceiling leaves any brightness eligible.
    pub fn is_degenerate(&self) -> bool {
        self.ceiling >= 255.0
    }

    /// Normalized brightness excess, or `None` if the cell is not eligible.
    pub fn factor(&self, brightness: f32) -> Option<f32> {
        if self.is_degenerate() || brightness <= self.ceiling {
            return None;
        }
        Some(((brightness - self.ceiling) / (255.0 - self.ceiling)).min(1.0))
    }

    /// Probability that a cell at this brightness spawns a particle.
    pub fn chance(&self, brightness: f32) -> f32 {
        match self.factor(brightness) {
            Some(factor) => (self.base_chance + factor * BRIGHTNESS_WEIGHT).min(1.0),
            None => 0.0,
        }
    }

    /// Roll for a particle. Returns the brightness factor on success.
    ///
    /// Ineligible cells never consume a random number.
    pub fn roll<R: Rng>(&self, brightness: f32, rng: &mut R) -> Option<f32> {
        let factor = self.factor(brightness)?;
        let chance = (self.base_chance + factor * BRIGHTNESS_WEIGHT).min(1.0);
        if rng.random::<f32>() < chance {
            Some(factor)
        } else {
            None
        }
    }
}

/// Disc radius for a particle on a grid of the given stride.
#[inline]
pub fn radius(grid_step: u32, factor: f32) -> f32 {
    (grid_step as f32 / 3.0) * (0.8 + factor)
}

/// Whether a particle drawn at this brightness hides the glyph.
#[inline]
pub fn suppresses_glyph(brightness: f32) -> bool {
    brightness > GLYPH_SUPPRESS_BRIGHTNESS
}
