//! # Process Settings
//!
//! The parameter record consumed by the render pipeline. Settings arrive from
//! a JSON document (settings file, HTTP form field) or from CLI flags, and
//! are validated once at that boundary via [`ProcessSettings::validate`].
//!
//! ## JSON Shape
//!
//! ```json
//! {
//!   "grid_step": 8,
//!   "particle_probability": 25,
//!   "brightness_floor": 15,
//!   "particle_ceiling": 180,
//!   "glyph_size": 12,
//!   "palette": "encryption",
//!   "color_mode": "spectral"
//! }
//! ```
//!
//! Every key is optional; missing keys take the defaults above.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::GlitchError;

/// Largest accepted glyph size in pixels.
pub const MAX_GLYPH_SIZE: u32 = 256;

/// Color grading mode applied to glyphs and particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Everything white
    Mono,
    /// Five-band brightness gradient: deep blue → cyan → green → orange → white
    #[default]
    Spectral,
    /// Three-band magenta / teal / ice-blue
    Cyber,
    /// Sampled pixel color with a fixed 1.3x boost
    Original,
}

impl ColorMode {
    /// All modes, in display order.
    pub const ALL: [ColorMode; 4] = [
        ColorMode::Mono,
        ColorMode::Spectral,
        ColorMode::Cyber,
        ColorMode::Original,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Mono => "mono",
            ColorMode::Spectral => "spectral",
            ColorMode::Cyber => "cyber",
            ColorMode::Original => "original",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = GlitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mono" => Ok(ColorMode::Mono),
            "spectral" => Ok(ColorMode::Spectral),
            "cyber" => Ok(ColorMode::Cyber),
            "original" => Ok(ColorMode::Original),
            other => Err(GlitchError::invalid(format!(
                "unknown color mode '{}' (expected mono, spectral, cyber or original)",
                other
            ))),
        }
    }
}

/// Tunable parameters for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessSettings {
    /// Sampling stride in pixels. Lower = denser grid. Must be >= 1.
    pub grid_step: u32,
    /// Base chance (percent, 0-100) that an eligible cell spawns a particle.
    pub particle_probability: f32,
    /// Cells darker than this (0-255, after gamma) are skipped entirely.
    pub brightness_floor: f32,
    /// Cells brighter than this (0-255, after gamma) may spawn particles.
    pub particle_ceiling: f32,
    /// Glyph height in pixels. Does not affect sampling.
    pub glyph_size: u32,
    /// Character ramp name; unknown names fall back to `standard`.
    pub palette: String,
    pub color_mode: ColorMode,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            grid_step: 8,
            particle_probability: 25.0,
            brightness_floor: 15.0,
            particle_ceiling: 180.0,
            glyph_size: 12,
            palette: "encryption".to_string(),
            color_mode: ColorMode::Spectral,
        }
    }
}

impl ProcessSettings {
    /// Parse settings from a JSON document. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, GlitchError> {
        let settings: ProcessSettings = serde_json::from_str(json)
            .map_err(|e| GlitchError::invalid(format!("settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    ///
    /// An unreadable or malformed file is a [`GlitchError::Config`]; values
    /// outside their domain are still [`GlitchError::InvalidParameter`].
    pub fn from_file(path: &Path) -> Result<Self, GlitchError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            GlitchError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings: ProcessSettings = serde_json::from_str(&json).map_err(|e| {
            GlitchError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every field against its documented domain.
    ///
    /// Runs before any pixel work; a failing record produces no output.
    pub fn validate(&self) -> Result<(), GlitchError> {
        if self.grid_step == 0 {
            return Err(GlitchError::invalid("grid_step must be >= 1"));
        }
        check_range("particle_probability", self.particle_probability, 0.0, 100.0)?;
        check_range("brightness_floor", self.brightness_floor, 0.0, 255.0)?;
        check_range("particle_ceiling", self.particle_ceiling, 0.0, 255.0)?;
        if self.glyph_size < 1 || self.glyph_size > MAX_GLYPH_SIZE {
            return Err(GlitchError::invalid(format!(
                "glyph_size must be in 1..={}, got {}",
                MAX_GLYPH_SIZE, self.glyph_size
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ProcessSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step={} particles={:.0}% floor={:.0} ceiling={:.0} glyph={}px palette={} mode={}",
            self.grid_step,
            self.particle_probability,
            self.brightness_floor,
            self.particle_ceiling,
            self.glyph_size,
            self.palette,
            self.color_mode
        )
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), GlitchError> {
    // NaN fails both comparisons, so test containment rather than exclusion
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GlitchError::invalid(format!(
            "{} must be in {}..={}, got {}",
            name, min, max, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ProcessSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.grid_step, 8);
        assert_eq!(settings.palette, "encryption");
        assert_eq!(settings.color_mode, ColorMode::Spectral);
    }

    #[test]
    fn test_zero_grid_step_rejected() {
        let settings = ProcessSettings {
            grid_step: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(GlitchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let cases = [
            ProcessSettings {
                particle_probability: 101.0,
                ..Default::default()
            },
            ProcessSettings {
                brightness_floor: -1.0,
                ..Default::default()
            },
            ProcessSettings {
                particle_ceiling: 300.0,
                ..Default::default()
            },
            ProcessSettings {
                particle_ceiling: f32::NAN,
                ..Default::default()
            },
            ProcessSettings {
                glyph_size: 0,
                ..Default::default()
            },
        ];
        for settings in cases {
            assert!(settings.validate().is_err(), "{} should fail", settings);
        }
    }

    #[test]
    fn test_ceiling_below_floor_is_allowed() {
        let settings = ProcessSettings {
            brightness_floor: 200.0,
            particle_ceiling: 100.0,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            ProcessSettings::from_json(r#"{"grid_step": 4, "color_mode": "cyber"}"#).unwrap();
        assert_eq!(
            settings,
            ProcessSettings {
                grid_step: 4,
                color_mode: ColorMode::Cyber,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unknown_color_mode_json_rejected() {
        let err = ProcessSettings::from_json(r#"{"color_mode": "sepia"}"#).unwrap_err();
        assert!(matches!(err, GlitchError::InvalidParameter(_)));
    }

    #[test]
    fn test_json_validation_applies() {
        let err = ProcessSettings::from_json(r#"{"grid_step": 0}"#).unwrap_err();
        assert!(matches!(err, GlitchError::InvalidParameter(_)));
    }

    fn write_settings_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "neuroglitch-{}-{}.json",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_malformed_settings_file_is_config_error() {
        let path = write_settings_file("malformed", "{ not json");
        let err = ProcessSettings::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, GlitchError::Config(_)), "{:?}", err);
    }

    #[test]
    fn test_out_of_range_settings_file_is_invalid_parameter() {
        let path = write_settings_file("out-of-range", r#"{"particle_probability": 400}"#);
        let err = ProcessSettings::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, GlitchError::InvalidParameter(_)), "{:?}", err);
    }

    #[test]
    fn test_missing_settings_file_is_config_error() {
        let err = ProcessSettings::from_file(Path::new("/nonexistent/look.json")).unwrap_err();
        assert!(matches!(err, GlitchError::Config(_)));
    }

    #[test]
    fn test_color_mode_from_str() {
        for mode in ColorMode::ALL {
            assert_eq!(mode.name().parse::<ColorMode>().unwrap(), mode);
        }
        assert_eq!("CYBER".parse::<ColorMode>().unwrap(), ColorMode::Cyber);
        assert!("neon".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let settings = ProcessSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"color_mode\":\"spectral\""));
        assert_eq!(ProcessSettings::from_json(&json).unwrap(), settings);
    }
}
