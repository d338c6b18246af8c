//! # Neuroglitch - Photo Glitch Renderer
//!
//! Neuroglitch turns a photo into a stylized "neural glitch" composite:
//! a sharpened, luma-mapped field of text glyphs overlaid with glowing
//! particles on the highlights. It provides:
//!
//! - **Pipeline**: resample, 3×3 sharpen, BT.601 luma with gamma remap
//! - **Glyph mapping**: named character ramps from dense to sparse
//! - **Color grading**: mono, spectral, cyber and boosted original
//! - **Particles**: stochastic glowing discs, reproducible with a seed
//! - **Server**: upload once, re-render with new settings, download PNG
//!
//! ## Quick Start
//!
//! ```no_run
//! use neuroglitch::{ColorMode, ProcessSettings, RenderConfig, Surface, decode, render};
//! use std::path::Path;
//!
//! let source = decode::load_path(Path::new("photo.jpg"))?;
//!
//! let settings = ProcessSettings {
//!     color_mode: ColorMode::Cyber,
//!     grid_step: 6,
//!     ..Default::default()
//! };
//!
//! let mut surface = Surface::new();
//! let stats = render::render(&source, &mut surface, &settings, &RenderConfig::default())?;
//! println!("{} glyphs, {} particles", stats.glyphs_drawn, stats.particles_drawn);
//!
//! surface.save_png(Path::new("glitch.png"))?;
//! # Ok::<(), neuroglitch::GlitchError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`render`] | Pixel pipeline and destination surface |
//! | [`palette`] | Glyph ramps |
//! | [`settings`] | Per-render parameters and color modes |
//! | [`config`] | Working resolution and RNG seed |
//! | [`decode`] | Image file acquisition |
//! | [`server`] | HTTP upload/render API |
//! | [`error`] | Error types |

pub mod config;
pub mod decode;
pub mod error;
pub mod palette;
pub mod render;
pub mod server;
pub mod settings;

// Re-exports for convenience
pub use config::RenderConfig;
pub use error::GlitchError;
pub use render::surface::Surface;
pub use settings::{ColorMode, ProcessSettings};
