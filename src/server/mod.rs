//! # HTTP Server for Glitch Rendering
//!
//! Upload a photo once, then re-render it with different settings and
//! download the PNG.
//!
//! ## Usage
//!
//! ```bash
//! neuroglitch serve --listen 0.0.0.0:8080
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | GET | `/api/palettes` | `[{name, glyphs}]` |
//! | GET | `/api/color-modes` | `["mono", ...]` |
//! | GET | `/api/settings/default` | default settings JSON |
//! | POST | `/api/photo/upload` | `{id, filename, width, height}` |
//! | GET | `/api/photo/:id/render?grid_step=..&seed=..` | `image/png` |
//! | POST | `/api/render` | `image/png` (multipart `image` + `settings`) |

mod handlers;
mod state;

pub use state::{AppState, PhotoSession, SESSION_EXPIRATION_SECS, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::GlitchError;

/// Upload size limit.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/palettes", get(handlers::palettes::list))
        .route("/api/color-modes", get(handlers::palettes::color_modes))
        .route(
            "/api/settings/default",
            get(handlers::palettes::default_settings),
        )
        .route(
            "/api/photo/upload",
            post(handlers::photo::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/photo/:id/render", get(handlers::photo::render_photo))
        .route(
            "/api/render",
            post(handlers::photo::render_once).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use neuroglitch::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), neuroglitch::GlitchError> {
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), GlitchError> {
    let app_state = Arc::new(AppState::new(config.clone()));

    tokio::spawn(cleanup_sessions(app_state.clone()));

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            GlitchError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        max_width = config.render.max_width,
        "neuroglitch HTTP server started"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| GlitchError::Server(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task to drop expired photo sessions.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));

    loop {
        interval.tick().await;
        let removed = state.cleanup_expired_sessions().await;
        if removed > 0 {
            let remaining = state.photo_sessions.read().await.len();
            info!(removed, remaining, "cleaned up expired photo sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use image::{ImageFormat, Rgb, RgbImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "neuroglitch-test-boundary";

    fn app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        (state.clone(), router(state))
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 8) as u8, (y * 8) as u8, 200]);
        }
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn multipart_body(image: &[u8], settings: Option<&str>) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"test.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
        if let Some(json) = settings {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"settings\"\r\n\r\n{json}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_palettes_route() {
        let (_, app) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/palettes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["encryption", "standard", "complex"]);
    }

    #[tokio::test]
    async fn test_default_settings_route() {
        let (_, app) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/settings/default")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let settings: crate::ProcessSettings =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(settings, crate::ProcessSettings::default());
    }

    #[tokio::test]
    async fn test_render_unknown_session() {
        let (_, app) = app();
        let uri = format!("/api/photo/{}/render", uuid::Uuid::new_v4());
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_bad_session_id() {
        let (_, app) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/photo/not-a-uuid/render")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_then_render() {
        let (state, app) = app();
        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/photo/upload",
                multipart_body(&png_bytes(32, 16), None),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let upload: handlers::photo::UploadResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!((upload.width, upload.height), (32, 16));
        assert_eq!(upload.filename, "test.png");
        assert_eq!(state.photo_sessions.read().await.len(), 1);

        let uri = format!(
            "/api/photo/{}/render?grid_step=4&color_mode=cyber&seed=3",
            upload.id
        );
        let response = app
            .clone()
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let first = body_bytes(response).await;
        let rendered = image::load_from_memory(&first).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (32, 16));

        // Same seed, same bytes
        let response = app
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, first);
    }

    #[tokio::test]
    async fn test_render_rejects_invalid_settings() {
        let (state, app) = app();
        let id = uuid::Uuid::new_v4();
        state.photo_sessions.write().await.insert(
            id,
            PhotoSession::new(
                image::DynamicImage::ImageRgb8(RgbImage::new(4, 4)),
                "a.png".to_string(),
            ),
        );
        let uri = format!("/api/photo/{id}/render?grid_step=0");
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_render_once_with_settings() {
        let (_, app) = app();
        let response = app
            .oneshot(multipart_request(
                "/api/render",
                multipart_body(&png_bytes(20, 10), Some(r#"{"color_mode":"mono","grid_step":5}"#)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let rendered = image::load_from_memory(&body_bytes(response).await).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (20, 10));
    }

    #[tokio::test]
    async fn test_render_once_rejects_bad_image() {
        let (_, app) = app();
        let response = app
            .oneshot(multipart_request(
                "/api/render",
                multipart_body(b"not an image", None),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
