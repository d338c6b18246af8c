//! # Rendering Module
//!
//! The pixel synthesis pipeline: one pass per source image (or per settings
//! change) from a decoded photo to the glitch composite.
//!
//! ## Modules
//!
//! - [`resample`]: bound the working resolution
//! - [`sharpen`]: 3×3 high-pass convolution
//! - [`luma`]: BT.601 brightness with gamma remap
//! - [`grade`]: color modes
//! - [`particle`]: highlight particle rule
//! - [`compose`]: grid walk producing draw commands
//! - [`surface`]: destination raster, the single writer
//! - [`font`]: glyph bitmaps
//!
//! ## Pipeline
//!
//! ```text
//! source ─► resample ─► sharpen ─► plan (per cell) ─► surface
//!                                   │
//!                  luma' ─► grade ──┼─► Particle cmd
//!                                   └─► Glyph cmd
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use neuroglitch::config::RenderConfig;
//! use neuroglitch::render::{self, surface::Surface};
//! use neuroglitch::settings::ProcessSettings;
//!
//! let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([180, 90, 40])));
//! let mut surface = Surface::new();
//! let config = RenderConfig::DEFAULT.with_seed(7);
//!
//! let stats = render::render(&source, &mut surface, &ProcessSettings::default(), &config)?;
//! assert_eq!((surface.width(), surface.height()), (64, 32));
//! assert_eq!(stats.cells_sampled, 8 * 4);
//! # Ok::<(), neuroglitch::GlitchError>(())
//! ```

pub mod compose;
pub mod font;
pub mod grade;
pub mod luma;
pub mod particle;
pub mod resample;
pub mod sharpen;
pub mod surface;

use image::{DynamicImage, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::GlitchError;
use crate::palette::Ramp;
use crate::settings::ProcessSettings;
use compose::CellCounts;
use font::GlyphAtlas;
use surface::Surface;

/// Summary of one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Working (and surface) width.
    pub width: u32,
    /// Working (and surface) height.
    pub height: u32,
    pub cells_sampled: usize,
    pub cells_skipped: usize,
    pub glyphs_drawn: usize,
    pub particles_drawn: usize,
}

impl RenderStats {
    fn new(width: u32, height: u32, counts: CellCounts) -> Self {
        Self {
            width,
            height,
            cells_sampled: counts.sampled,
            cells_skipped: counts.skipped,
            glyphs_drawn: counts.glyphs,
            particles_drawn: counts.particles,
        }
    }

    /// Whether the source had zero area and nothing was rendered.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Render `source` into `surface`.
///
/// Particles use a seeded RNG when `config.seed` is set, otherwise the
/// thread RNG.
pub fn render(
    source: &DynamicImage,
    surface: &mut Surface,
    settings: &ProcessSettings,
    config: &RenderConfig,
) -> Result<RenderStats, GlitchError> {
    match config.seed {
        Some(seed) => render_with_rng(
            source,
            surface,
            settings,
            config,
            &mut StdRng::seed_from_u64(seed),
        ),
        None => render_with_rng(source, surface, settings, config, &mut rand::rng()),
    }
}

/// Render with an explicit random source for the particle layer.
pub fn render_with_rng<R: Rng>(
    source: &DynamicImage,
    surface: &mut Surface,
    settings: &ProcessSettings,
    config: &RenderConfig,
    rng: &mut R,
) -> Result<RenderStats, GlitchError> {
    let ramp = Ramp::resolve(&settings.palette);
    render_with_ramp(source, surface, settings, &ramp, config, rng)
}

/// Render with an explicit glyph ramp, bypassing the palette registry.
pub fn render_with_ramp<R: Rng>(
    source: &DynamicImage,
    surface: &mut Surface,
    settings: &ProcessSettings,
    ramp: &Ramp,
    config: &RenderConfig,
    rng: &mut R,
) -> Result<RenderStats, GlitchError> {
    settings.validate()?;
    config.validate()?;

    let mut working = resample::resample(source, config.max_width);
    let (width, height) = working.dimensions();
    surface.resize(width, height)?;

    if width == 0 || height == 0 {
        debug!(
            source_width = source.width(),
            source_height = source.height(),
            "empty source, nothing to render"
        );
        return Ok(RenderStats::default());
    }

    sharpen::sharpen(&mut working);

    let plan = compose::plan(&working, settings, ramp, rng);
    let atlas = GlyphAtlas::new(settings.glyph_size, ramp.glyphs());
    surface.apply_all(&plan.commands, &atlas);

    let stats = RenderStats::new(width, height, plan.counts);
    debug!(
        width,
        height,
        cells = stats.cells_sampled,
        skipped = stats.cells_skipped,
        glyphs = stats.glyphs_drawn,
        particles = stats.particles_drawn,
        "render complete"
    );
    Ok(stats)
}

/// Render into a fresh image.
pub fn render_to_image(
    source: &DynamicImage,
    settings: &ProcessSettings,
    config: &RenderConfig,
) -> Result<RgbImage, GlitchError> {
    let mut surface = Surface::new();
    render(source, &mut surface, settings, config)?;
    Ok(surface.into_image())
}
