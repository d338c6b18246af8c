//! # Error Types
//!
//! This module defines error types used throughout the neuroglitch library.
//!
//! Zero-area sources and a particle ceiling of 255 are reachable
//! configurations, not errors: the first renders to an empty surface, the
//! second simply disables the particle layer.

use thiserror::Error;

/// Main error type for neuroglitch operations
#[derive(Debug, Error)]
pub enum GlitchError {
    /// A render parameter is outside its documented domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The destination surface could not be resized
    #[error("Failed to allocate {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// Source image could not be decoded
    #[error("Image error: {0}")]
    Image(String),

    /// Rendered surface could not be encoded or written
    #[error("Encode error: {0}")]
    Encode(String),

    /// Settings file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// HTTP server error (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlitchError {
    /// Shorthand for building an [`GlitchError::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Whether the caller can fix this by supplying different input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_) | Self::Image(_) | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = GlitchError::invalid("grid_step must be >= 1");
        assert_eq!(err.to_string(), "Invalid parameter: grid_step must be >= 1");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_allocation_is_not_client_error() {
        let err = GlitchError::SurfaceAllocation {
            width: 10,
            height: 20,
        };
        assert_eq!(err.to_string(), "Failed to allocate 10x20 surface");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_decode_is_client_error_but_encode_is_not() {
        assert!(GlitchError::Image("bad upload".into()).is_client_error());
        assert!(!GlitchError::Encode("png writer failed".into()).is_client_error());
    }
}
