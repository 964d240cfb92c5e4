//! Taxi destination dialogue service
//!
//! Collects a ride destination from elderly passengers over a WebSocket,
//! one spoken or typed turn at a time, and confirms it before handing it to
//! the location search.

mod api;
mod config;
mod directory;
mod llm;
mod normalizer;
mod prompts;
mod runtime;
mod speech;
mod state_machine;
mod vision;
mod vocabulary;

use api::{create_router, AppState};
use config::AppConfig;
use directory::SeoulSubwayDirectory;
use llm::{LlmService, LoggingService, OpenAIService};
use normalizer::LlmNormalizer;
use runtime::SessionManager;
use speech::GoogleSpeechTranscriber;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vision::GoogleVisionDetector;
use vocabulary::Vocabulary;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taxi_dialog=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Vocabulary
    let vocabulary = match &config.vocabulary_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading vocabulary");
            Vocabulary::from_file(path)?
        }
        None => Vocabulary::default(),
    };
    let vocabulary = Arc::new(vocabulary);

    // LLM normalizer
    let api_key = config.llm.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY; every turn will re-ask.");
        String::new()
    });
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(OpenAIService::new(
        api_key,
        config.llm.model.clone(),
        config.llm.base_url.as_deref(),
    ))));
    tracing::info!(
        model = %llm.model_id(),
        temperature = config.llm.temperature,
        timeout_secs = config.llm.timeout.as_secs(),
        "LLM normalizer initialized"
    );
    let normalizer = LlmNormalizer::new(
        llm,
        config.llm.temperature,
        config.llm.timeout,
        vocabulary.unresolved_sentinel.clone(),
    );

    // Collaborators
    if config.seoul_api_key.is_none() {
        tracing::warn!("SEOUL_OPENAPI_KEY not set; no destination will be treated as a subway station.");
    }
    let directory =
        SeoulSubwayDirectory::new(config.seoul_api_key.clone(), config.seoul_base_url.as_deref());

    if config.speech_api_key.is_none() {
        tracing::warn!("GOOGLE_SPEECH_API_KEY not set; audio turns will be empty.");
    }
    let transcriber = GoogleSpeechTranscriber::new(
        config.speech_api_key.clone(),
        config.speech_base_url.as_deref(),
    );

    if config.vision_api_key.is_none() {
        tracing::warn!("GOOGLE_VISION_API_KEY not set; /api/ocr will fail.");
    }
    let detector = GoogleVisionDetector::new(
        config.vision_api_key.clone(),
        config.vision_base_url.as_deref(),
    );

    // Create application state
    let sessions = SessionManager::new(Arc::new(normalizer), Arc::new(directory), vocabulary);
    let state = AppState::new(sessions, Arc::new(transcriber), Arc::new(detector));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Taxi dialogue server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
