//! HTTP request handlers

use super::types::{DetectedTextResponse, ErrorResponse, HealthResponse, TranscriptResponse};
use super::ws::ws_handler;
use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Dialogue
        .route("/ws", get(ws_handler))
        // Standalone speech-to-text
        .route("/api/stt", post(transcribe))
        // Sign photo to destination text
        .route("/api/ocr", post(detect_text))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Speech-to-text
// ============================================================

/// Raw 16 kHz mono LINEAR16 body in, transcript out (one line per
/// recognized segment)
async fn transcribe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TranscriptResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Empty audio body".to_string()));
    }

    let transcript = state
        .transcriber
        .transcribe_segments(&body)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(TranscriptResponse { transcript }))
}

// ============================================================
// Text detection
// ============================================================

/// Encoded image body in, selected sign text out
async fn detect_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DetectedTextResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Empty image body".to_string()));
    }

    let text = state
        .detector
        .detect_text(&body)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(DetectedTextResponse { text }))
}

// ============================================================
// Health & Version
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.len().await,
    })
}

async fn get_version() -> &'static str {
    concat!("taxi-dialog ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    /// A collaborating service failed
    Upstream(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream service error");
                (StatusCode::BAD_GATEWAY, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
