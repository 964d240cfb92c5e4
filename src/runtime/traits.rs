//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::llm::LlmError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Turns free-form speech into the canonical text the dialogue stores
#[async_trait]
pub trait DestinationNormalizer: Send + Sync {
    /// Correct and extract a place name from an utterance
    async fn normalize(&self, utterance: &str) -> Result<String, LlmError>;

    /// Extract the branch of the chain store `destination`
    async fn normalize_branch(&self, destination: &str, utterance: &str)
        -> Result<String, LlmError>;

    /// Extract the exit number for the station `destination`
    async fn normalize_exit(&self, destination: &str, utterance: &str) -> Result<String, LlmError>;
}

/// Subway station lookup.
///
/// Implementations fail closed: any lookup error means "not a station".
#[async_trait]
pub trait StationDirectory: Send + Sync {
    async fn is_subway_station(&self, name: &str) -> bool;
}

/// Speech-to-text error
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("speech service not configured")]
    NotConfigured,
    #[error("speech request failed: {0}")]
    Request(String),
    #[error("speech service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid speech response: {0}")]
    InvalidResponse(String),
}

/// Speech-to-text for 16 kHz mono LINEAR16 audio
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe raw PCM, keeping only the first recognized segment; an
    /// empty string means nothing was recognized
    async fn transcribe(&self, pcm: &[u8]) -> Result<String, TranscriptionError>;

    /// Transcribe raw PCM, every recognized segment on its own line
    async fn transcribe_segments(&self, pcm: &[u8]) -> Result<String, TranscriptionError>;
}

/// Text detection error
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("vision service not configured")]
    NotConfigured,
    #[error("vision request failed: {0}")]
    Request(String),
    #[error("vision service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid vision response: {0}")]
    InvalidResponse(String),
}

/// Reads destination text off a photographed sign
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Detect text in an encoded image; empty when nothing usable was found
    async fn detect_text(&self, image: &[u8]) -> Result<String, DetectionError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: DestinationNormalizer + ?Sized> DestinationNormalizer for Arc<T> {
    async fn normalize(&self, utterance: &str) -> Result<String, LlmError> {
        (**self).normalize(utterance).await
    }

    async fn normalize_branch(
        &self,
        destination: &str,
        utterance: &str,
    ) -> Result<String, LlmError> {
        (**self).normalize_branch(destination, utterance).await
    }

    async fn normalize_exit(&self, destination: &str, utterance: &str) -> Result<String, LlmError> {
        (**self).normalize_exit(destination, utterance).await
    }
}

#[async_trait]
impl<T: StationDirectory + ?Sized> StationDirectory for Arc<T> {
    async fn is_subway_station(&self, name: &str) -> bool {
        (**self).is_subway_station(name).await
    }
}

#[async_trait]
impl<T: SpeechTranscriber + ?Sized> SpeechTranscriber for Arc<T> {
    async fn transcribe(&self, pcm: &[u8]) -> Result<String, TranscriptionError> {
        (**self).transcribe(pcm).await
    }

    async fn transcribe_segments(&self, pcm: &[u8]) -> Result<String, TranscriptionError> {
        (**self).transcribe_segments(pcm).await
    }
}

#[async_trait]
impl<T: TextDetector + ?Sized> TextDetector for Arc<T> {
    async fn detect_text(&self, image: &[u8]) -> Result<String, DetectionError> {
        (**self).detect_text(image).await
    }
}
