//! Server state and configuration.

use image::DynamicImage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::RenderConfig;

/// Uploaded photos are dropped after this many seconds without a render.
pub const SESSION_EXPIRATION_SECS: u64 = 30 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Working resolution used for every render.
    pub render: RenderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            render: RenderConfig::DEFAULT,
        }
    }
}

/// A decoded upload, kept so settings can be changed without re-uploading.
#[derive(Debug, Clone)]
pub struct PhotoSession {
    pub image: Arc<DynamicImage>,
    pub filename: String,
    pub last_accessed: Instant,
}

impl PhotoSession {
    pub fn new(image: DynamicImage, filename: String) -> Self {
        Self {
            image: Arc::new(image),
            filename,
            last_accessed: Instant::now(),
        }
    }

    /// Mark the session as used.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.last_accessed) >= Duration::from_secs(SESSION_EXPIRATION_SECS)
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub photo_sessions: RwLock<HashMap<Uuid, PhotoSession>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            photo_sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Drop expired sessions. Returns how many were removed.
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.photo_sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }
}
