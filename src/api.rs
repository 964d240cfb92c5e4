//! HTTP and WebSocket API for the taxi dialogue service

mod handlers;
mod types;
mod ws;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::{SessionManager, SpeechTranscriber, TextDetector};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub detector: Arc<dyn TextDetector>,
}

impl AppState {
    pub fn new(
        sessions: SessionManager,
        transcriber: Arc<dyn SpeechTranscriber>,
        detector: Arc<dyn TextDetector>,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            transcriber,
            detector,
        }
    }
}
