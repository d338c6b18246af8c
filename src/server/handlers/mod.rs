//! HTTP handlers for the server.

pub mod palettes;
pub mod photo;

use axum::http::StatusCode;

use crate::error::GlitchError;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// Map a library error to a status: bad input is the caller's problem,
/// everything else is ours.
pub fn api_error(e: GlitchError) -> ApiError {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, e.to_string())
}
