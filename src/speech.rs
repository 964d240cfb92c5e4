//! Google Cloud Speech-to-Text (v1 REST) transcriber

use crate::runtime::{SpeechTranscriber, TranscriptionError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com";
const SAMPLE_RATE_HERTZ: u32 = 16_000;
const LANGUAGE_CODE: &str = "ko-KR";

pub struct GoogleSpeechTranscriber {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GoogleSpeechTranscriber {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Self {
        let endpoint = format!(
            "{}/v1/speech:recognize",
            base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            endpoint,
        }
    }
}

fn recognize_request(pcm: &[u8]) -> RecognizeRequest {
    RecognizeRequest {
        config: RecognitionConfig {
            encoding: "LINEAR16",
            sample_rate_hertz: SAMPLE_RATE_HERTZ,
            audio_channel_count: 1,
            language_code: LANGUAGE_CODE,
        },
        audio: RecognitionAudio {
            content: STANDARD.encode(pcm),
        },
    }
}

/// First alternative of the first result, or empty when nothing was recognized
fn first_transcript(response: RecognizeResponse) -> String {
    response
        .results
        .into_iter()
        .next()
        .and_then(RecognitionResult::best)
        .unwrap_or_default()
}

/// First alternative of every result, one line each
fn all_transcripts(response: RecognizeResponse) -> String {
    response
        .results
        .into_iter()
        .filter_map(RecognitionResult::best)
        .collect::<Vec<_>>()
        .join("\n")
}

impl GoogleSpeechTranscriber {
    async fn recognize(&self, pcm: &[u8]) -> Result<RecognizeResponse, TranscriptionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TranscriptionError::NotConfigured)?;

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&recognize_request(pcm))
            .send()
            .await
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            audio_bytes = pcm.len(),
            segments = parsed.results.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Speech transcribed"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl SpeechTranscriber for GoogleSpeechTranscriber {
    async fn transcribe(&self, pcm: &[u8]) -> Result<String, TranscriptionError> {
        self.recognize(pcm).await.map(first_transcript)
    }

    async fn transcribe_segments(&self, pcm: &[u8]) -> Result<String, TranscriptionError> {
        self.recognize(pcm).await.map(all_transcripts)
    }
}

// Speech API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    sample_rate_hertz: u32,
    audio_channel_count: u32,
    language_code: &'static str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

impl RecognitionResult {
    fn best(self) -> Option<String> {
        self.alternatives
            .into_iter()
            .next()
            .map(|alternative| alternative.transcript)
    }
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}
