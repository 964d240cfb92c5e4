//! API request and response types

use serde::{Deserialize, Serialize};

// ============================================================
// WebSocket frames
// ============================================================

/// Inbound frame: typed text, or base64 LINEAR16 audio
#[derive(Debug, Default, Deserialize)]
pub struct ClientFrame {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub audio_data: Option<String>,
}

/// Outbound frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerFrame {
    Message { message: String },
    Destination { destination: String },
    Error { error: String },
}

impl ServerFrame {
    pub fn message(text: impl Into<String>) -> Self {
        ServerFrame::Message {
            message: text.into(),
        }
    }

    pub fn destination(destination: impl Into<String>) -> Self {
        ServerFrame::Destination {
            destination: destination.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ServerFrame::Error {
            error: error.into(),
        }
    }
}

// ============================================================
// HTTP responses
// ============================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct DetectedTextResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
