//! # Render Configuration
//!
//! Knobs that belong to the host rather than to the artist: how large the
//! working buffer may get and whether the particle layer is seeded.
//!
//! ## Usage
//!
//! ```
//! use neuroglitch::config::RenderConfig;
//!
//! let config = RenderConfig::DEFAULT.with_seed(42);
//! assert_eq!(config.max_width, 1200);
//! assert_eq!(config.seed, Some(42));
//! ```

use crate::error::GlitchError;

/// Host-side render configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Maximum working-buffer width in pixels. Sources are never upscaled.
    pub max_width: u32,

    /// Seed for the particle layer. `None` draws from the thread RNG, so
    /// repeated renders differ.
    pub seed: Option<u64>,
}

impl RenderConfig {
    pub const DEFAULT: RenderConfig = RenderConfig {
        max_width: 1200,
        seed: None,
    };

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_max_width(self, max_width: u32) -> Self {
        Self { max_width, ..self }
    }

    pub fn validate(&self) -> Result<(), GlitchError> {
        if self.max_width == 0 {
            return Err(GlitchError::invalid("max_width must be >= 1"));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
