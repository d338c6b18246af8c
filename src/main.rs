//! # Neuroglitch CLI
//!
//! Command-line interface for the glitch renderer.
//!
//! ## Usage
//!
//! ```bash
//! # Render with defaults (writes neuroglitch-<millis>.png)
//! neuroglitch render photo.jpg
//!
//! # Tweak the look
//! neuroglitch render photo.jpg --color-mode cyber --grid-step 6 --particles 40
//!
//! # Reproducible particles, settings from a JSON file
//! neuroglitch render photo.jpg --settings look.json --seed 42 -o out.png
//!
//! # List glyph palettes
//! neuroglitch palettes
//!
//! # Start the HTTP server
//! neuroglitch serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use neuroglitch::{
    ColorMode, GlitchError, ProcessSettings, RenderConfig, Surface, decode, palette, render,
    server::{self, ServerConfig},
};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "neuroglitch=info,tower_http=info";

/// Neuroglitch - photo glitch renderer
#[derive(Parser, Debug)]
#[command(name = "neuroglitch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a photo to a glitch PNG
    Render {
        /// Input image (PNG, JPEG, WebP, ...)
        input: PathBuf,

        /// Output PNG (defaults to neuroglitch-<timestamp>.png)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// JSON settings file; individual flags override it
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Sampling stride in pixels
        #[arg(long)]
        grid_step: Option<u32>,

        /// Base particle probability, percent
        #[arg(long)]
        particles: Option<f32>,

        /// Brightness floor (0-255)
        #[arg(long)]
        floor: Option<f32>,

        /// Particle ceiling (0-255)
        #[arg(long)]
        ceiling: Option<f32>,

        /// Glyph height in pixels
        #[arg(long)]
        glyph_size: Option<u32>,

        /// Glyph palette name
        #[arg(long)]
        palette: Option<String>,

        /// Color mode: mono, spectral, cyber, original
        #[arg(long)]
        color_mode: Option<ColorMode>,

        /// Maximum working width in pixels
        #[arg(long, default_value_t = RenderConfig::DEFAULT.max_width)]
        max_width: u32,

        /// Seed for the particle layer
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List available glyph palettes
    Palettes,

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Maximum working width in pixels
        #[arg(long, default_value_t = RenderConfig::DEFAULT.max_width)]
        max_width: u32,
    },
}

/// Flag overrides applied on top of the settings file.
#[derive(Debug, Default)]
struct SettingsOverrides {
    grid_step: Option<u32>,
    particles: Option<f32>,
    floor: Option<f32>,
    ceiling: Option<f32>,
    glyph_size: Option<u32>,
    palette: Option<String>,
    color_mode: Option<ColorMode>,
}

impl SettingsOverrides {
    fn apply(self, settings: &mut ProcessSettings) {
        if let Some(v) = self.grid_step {
            settings.grid_step = v;
        }
        if let Some(v) = self.particles {
            settings.particle_probability = v;
        }
        if let Some(v) = self.floor {
            settings.brightness_floor = v;
        }
        if let Some(v) = self.ceiling {
            settings.particle_ceiling = v;
        }
        if let Some(v) = self.glyph_size {
            settings.glyph_size = v;
        }
        if let Some(v) = self.palette {
            settings.palette = v;
        }
        if let Some(v) = self.color_mode {
            settings.color_mode = v;
        }
    }
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), GlitchError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            settings,
            grid_step,
            particles,
            floor,
            ceiling,
            glyph_size,
            palette,
            color_mode,
            max_width,
            seed,
        } => {
            let overrides = SettingsOverrides {
                grid_step,
                particles,
                floor,
                ceiling,
                glyph_size,
                palette,
                color_mode,
            };
            let settings = load_settings(settings, overrides)?;
            let config = RenderConfig {
                max_width,
                seed,
            };
            let output = output.unwrap_or_else(default_output_path);
            render_file(&input, &output, &settings, &config)
        }

        Commands::Palettes => {
            println!("Available palettes:");
            for p in palette::PALETTES {
                println!("  {:<12} \"{}\"", p.name, p.glyphs);
            }
            Ok(())
        }

        Commands::Serve { listen, max_width } => {
            let config = ServerConfig {
                listen_addr: listen,
                render: RenderConfig::DEFAULT.with_max_width(max_width),
            };
            config.render.validate()?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }
    }
}

/// Defaults, then the optional settings file, then flags, then validation.
fn load_settings(
    path: Option<PathBuf>,
    overrides: SettingsOverrides,
) -> Result<ProcessSettings, GlitchError> {
    let mut settings = match path {
        Some(path) => ProcessSettings::from_file(&path)?,
        None => ProcessSettings::default(),
    };
    overrides.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "neuroglitch-{}.png",
        chrono::Utc::now().timestamp_millis()
    ))
}

fn render_file(
    input: &std::path::Path,
    output: &std::path::Path,
    settings: &ProcessSettings,
    config: &RenderConfig,
) -> Result<(), GlitchError> {
    let source = decode::load_path(input)?;
    info!(
        input = %input.display(),
        width = source.width(),
        height = source.height(),
        "loaded source"
    );

    let mut surface = Surface::new();
    let stats = render::render(&source, &mut surface, settings, config)?;
    if stats.is_empty() {
        return Err(GlitchError::Image(format!(
            "{} has no pixels to render",
            input.display()
        )));
    }

    surface.save_png(output)?;
    info!(
        output = %output.display(),
        width = stats.width,
        height = stats.height,
        glyphs = stats.glyphs_drawn,
        particles = stats.particles_drawn,
        "saved"
    );
    println!("Saved to {}", output.display());
    Ok(())
}
