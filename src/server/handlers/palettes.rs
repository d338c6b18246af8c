//! Palette and settings discovery handlers.

use axum::Json;

use crate::palette::{PALETTES, Palette};
use crate::settings::{ColorMode, ProcessSettings};

/// GET /api/palettes - List glyph palettes.
pub async fn list() -> Json<&'static [Palette]> {
    Json(PALETTES)
}

/// GET /api/color-modes - List color modes.
pub async fn color_modes() -> Json<[ColorMode; 4]> {
    Json(ColorMode::ALL)
}

/// GET /api/settings/default - Default settings for a fresh form.
pub async fn default_settings() -> Json<ProcessSettings> {
    Json(ProcessSettings::default())
}
