//! # Compositor
//!
//! Walks the sampling grid and turns every surviving cell into immutable
//! draw commands. Planning is separate from painting: this module decides
//! *what* goes where, [`Surface`](super::surface::Surface) is the single
//! writer that paints it.
//!
//! ## Per-cell sequence
//!
//! ```text
//! sample (r, g, b) ─► luma' ─┬─ < floor? ─► skip cell
//!                            ├─ grade ──────────────┐
//!                            ├─ particle roll ──► Particle { glow }
//!                            └─ ramp lookup ────► Glyph (unless blank, or
//!                                                  hidden by a particle
//!                                                  above luma' 230)
//! ```
//!
//! Cells are visited row-major with stride `grid_step`, so a dimension of
//! length `L` yields `ceil(L / grid_step)` cells. Rows are planned in
//! parallel; each row draws from its own RNG stream seeded from the caller's
//! RNG, which keeps seeded renders reproducible regardless of scheduling.

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::grade::{WHITE, grade};
use super::luma;
use super::particle::{self, GLOW_BLUR, ParticleRule};
use crate::palette::{Ramp, is_blank};
use crate::settings::{ColorMode, ProcessSettings};

/// Glow parameters carried by a particle command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Light source color.
    pub color: Rgb<u8>,
    /// Blur radius in pixels.
    pub blur: f32,
}

/// One immutable drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled disc with an additive glow, centered on a cell.
    Particle {
        center: (f32, f32),
        radius: f32,
        fill: Rgb<u8>,
        glow: Glow,
    },
    /// A ramp glyph centered on a cell.
    Glyph {
        center: (f32, f32),
        glyph: char,
        size: u32,
        color: Rgb<u8>,
    },
}

/// Counters gathered while planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    /// Grid cells visited.
    pub sampled: usize,
    /// Cells below the brightness floor.
    pub skipped: usize,
    pub glyphs: usize,
    pub particles: usize,
}

impl CellCounts {
    fn merge(&mut self, other: CellCounts) {
        self.sampled += other.sampled;
        self.skipped += other.skipped;
        self.glyphs += other.glyphs;
        self.particles += other.particles;
    }
}

/// Planned commands for a whole working buffer, in row-major draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub commands: Vec<DrawCommand>,
    pub counts: CellCounts,
}

/// Number of grid cells along a dimension.
#[inline]
pub fn cells_along(length: u32, grid_step: u32) -> u32 {
    length.div_ceil(grid_step.max(1))
}

/// Plan every grid cell of a sharpened working buffer.
pub fn plan<R: Rng>(
    buffer: &RgbImage,
    settings: &ProcessSettings,
    ramp: &Ramp,
    rng: &mut R,
) -> Plan {
    let step = settings.grid_step.max(1) as usize;
    let rows: Vec<u32> = (0..buffer.height()).step_by(step).collect();
    let seeds: Vec<u64> = rows.iter().map(|_| rng.random()).collect();
    let rule = ParticleRule::new(settings);

    let row_plans: Vec<Plan> = rows
        .par_iter()
        .zip(seeds.par_iter())
        .map(|(&y, &seed)| {
            let mut row_rng = StdRng::seed_from_u64(seed);
            let mut row_plan = Plan::default();
            for x in (0..buffer.width()).step_by(step) {
                plan_cell(buffer, x, y, settings, ramp, &rule, &mut row_rng, &mut row_plan);
            }
            row_plan
        })
        .collect();

    let mut plan = Plan::default();
    for row_plan in row_plans {
        plan.commands.extend(row_plan.commands);
        plan.counts.merge(row_plan.counts);
    }
    plan
}

/// Plan a single cell, appending at most a particle and a glyph.
#[allow(clippy::too_many_arguments)]
fn plan_cell<R: Rng>(
    buffer: &RgbImage,
    x: u32,
    y: u32,
    settings: &ProcessSettings,
    ramp: &Ramp,
    rule: &ParticleRule,
    rng: &mut R,
    plan: &mut Plan,
) {
    plan.counts.sampled += 1;

    let (rgb, brightness) = luma::sample(buffer, x, y);
    if brightness < settings.brightness_floor {
        plan.counts.skipped += 1;
        return;
    }

    let color = grade(settings.color_mode, rgb, brightness);
    let center = (x as f32, y as f32);

    let mut particle_drawn = false;
    if let Some(factor) = rule.roll(brightness, rng) {
        let fill = if settings.color_mode == ColorMode::Mono {
            WHITE
        } else {
            color
        };
        plan.commands.push(DrawCommand::Particle {
            center,
            radius: particle::radius(settings.grid_step, factor),
            fill,
            glow: Glow {
                color,
                blur: GLOW_BLUR,
            },
        });
        plan.counts.particles += 1;
        particle_drawn = true;
    }

    if particle_drawn && particle::suppresses_glyph(brightness) {
        return;
    }

    let glyph = ramp.glyph_for(brightness);
    if is_blank(glyph) {
        return;
    }
    plan.commands.push(DrawCommand::Glyph {
        center,
        glyph,
        size: settings.glyph_size,
        color,
    });
    plan.counts.glyphs += 1;
}
