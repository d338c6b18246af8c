//! Photo upload and render API handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::RenderConfig,
    decode,
    error::GlitchError,
    render::{self, surface::Surface},
    settings::{ColorMode, ProcessSettings},
};

use super::super::state::{AppState, PhotoSession};
use super::{ApiError, api_error};

/// Response from upload endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Query parameters for the render endpoint. Missing fields take defaults.
///
/// Fields are listed explicitly rather than flattening [`ProcessSettings`]
/// because flattened numbers do not survive query-string decoding.
#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    pub grid_step: Option<u32>,
    pub particle_probability: Option<f32>,
    pub brightness_floor: Option<f32>,
    pub particle_ceiling: Option<f32>,
    pub glyph_size: Option<u32>,
    pub palette: Option<String>,
    pub color_mode: Option<ColorMode>,
    pub seed: Option<u64>,
}

impl RenderQuery {
    pub fn settings(&self) -> ProcessSettings {
        let defaults = ProcessSettings::default();
        ProcessSettings {
            grid_step: self.grid_step.unwrap_or(defaults.grid_step),
            particle_probability: self
                .particle_probability
                .unwrap_or(defaults.particle_probability),
            brightness_floor: self.brightness_floor.unwrap_or(defaults.brightness_floor),
            particle_ceiling: self.particle_ceiling.unwrap_or(defaults.particle_ceiling),
            glyph_size: self.glyph_size.unwrap_or(defaults.glyph_size),
            palette: self.palette.clone().unwrap_or(defaults.palette),
            color_mode: self.color_mode.unwrap_or(defaults.color_mode),
        }
    }
}

/// Fields pulled out of a multipart request.
#[derive(Debug, Default)]
struct UploadFields {
    image: Option<(Vec<u8>, String)>,
    settings: Option<String>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadFields, ApiError> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read image: {}", e))
                })?;
                fields.image = Some((bytes.to_vec(), filename));
            }
            "settings" => {
                let text = field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read settings: {}", e))
                })?;
                fields.settings = Some(text);
            }
            _ => {}
        }
    }
    Ok(fields)
}

/// Decode off the async runtime.
async fn decode_upload(bytes: Vec<u8>, filename: String) -> Result<DynamicImage, ApiError> {
    tokio::task::spawn_blocking(move || decode::decode_bytes(&bytes, &filename))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing error: {}", e),
            )
        })?
        .map_err(api_error)
}

/// Render off the async runtime and encode as PNG.
async fn render_png(
    image: Arc<DynamicImage>,
    settings: ProcessSettings,
    config: RenderConfig,
) -> Result<Vec<u8>, ApiError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, GlitchError> {
        let mut surface = Surface::new();
        let stats = render::render(&image, &mut surface, &settings, &config)?;
        if stats.is_empty() {
            return Err(GlitchError::Image("image has no pixels".to_string()));
        }
        debug!(
            width = stats.width,
            height = stats.height,
            glyphs = stats.glyphs_drawn,
            particles = stats.particles_drawn,
            "rendered"
        );
        surface.encode_png()
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Processing error: {}", e),
        )
    })?
    .map_err(api_error)
}

fn png_response(png_bytes: Vec<u8>) -> impl IntoResponse {
    let disposition = format!(
        "inline; filename=\"neuroglitch-{}.png\"",
        chrono::Utc::now().timestamp_millis()
    );
    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png_bytes,
    )
}

/// POST /api/photo/upload - Upload an image file.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    state.cleanup_expired_sessions().await;

    let (bytes, filename) = read_multipart(multipart)
        .await?
        .image
        .ok_or((StatusCode::BAD_REQUEST, "No image field found".to_string()))?;

    let img = decode_upload(bytes, filename.clone()).await?;
    let (width, height) = (img.width(), img.height());

    let session_id = Uuid::new_v4();
    {
        let mut sessions = state.photo_sessions.write().await;
        sessions.insert(session_id, PhotoSession::new(img, filename.clone()));
    }
    info!(%session_id, %filename, width, height, "photo uploaded");

    Ok(Json(UploadResponse {
        id: session_id.to_string(),
        filename,
        width,
        height,
    }))
}

/// GET /api/photo/:id/render - Render an uploaded photo with the given settings.
pub async fn render_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid session ID".to_string()))?;

    let settings = query.settings();
    settings.validate().map_err(api_error)?;

    // Clone the Arc to release the lock before rendering
    let source_image = {
        let mut sessions = state.photo_sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or((StatusCode::NOT_FOUND, "Session not found or expired".to_string()))?;
        session.touch();
        session.image.clone()
    };

    let config = RenderConfig {
        seed: query.seed,
        ..state.config.render
    };
    let png_bytes = render_png(source_image, settings, config).await?;
    Ok(png_response(png_bytes))
}

/// POST /api/render - One-shot render of a multipart upload.
///
/// Expects an `image` field and an optional `settings` JSON field.
pub async fn render_once(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let fields = read_multipart(multipart).await?;

    let settings = match fields.settings.as_deref() {
        Some(json) if !json.trim().is_empty() => {
            ProcessSettings::from_json(json).map_err(api_error)?
        }
        _ => ProcessSettings::default(),
    };

    let (bytes, filename) = fields
        .image
        .ok_or((StatusCode::BAD_REQUEST, "No image field found".to_string()))?;
    let img = decode_upload(bytes, filename).await?;

    let png_bytes = render_png(Arc::new(img), settings, state.config.render).await?;
    Ok(png_response(png_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_query_gives_defaults() {
        assert_eq!(RenderQuery::default().settings(), ProcessSettings::default());
    }

    #[test]
    fn test_query_overrides() {
        let query = RenderQuery {
            grid_step: Some(3),
            color_mode: Some(ColorMode::Cyber),
            palette: Some("complex".to_string()),
            ..Default::default()
        };
        let settings = query.settings();
        assert_eq!(settings.grid_step, 3);
        assert_eq!(settings.color_mode, ColorMode::Cyber);
        assert_eq!(settings.palette, "complex");
        assert_eq!(settings.glyph_size, ProcessSettings::default().glyph_size);
    }

    #[test]
    fn test_api_error_status() {
        let (status, _) = api_error(GlitchError::invalid("grid_step"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = api_error(GlitchError::SurfaceAllocation {
            width: 1,
            height: 1,
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_decode_failure_is_400_and_encode_failure_is_500() {
        let (status, _) = api_error(GlitchError::Image("truncated JPEG".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = api_error(GlitchError::Encode("PNG encoding failed".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
