//! Mock implementations for testing
//!
//! These mocks enable dialogue tests without network I/O.

use super::traits::*;
use crate::llm::LlmError;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

// ============================================================================
// Mock Normalizer
// ============================================================================

/// Which normalizer entry point a call went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizerCall {
    Destination(String),
    Branch { destination: String, utterance: String },
    Exit { destination: String, utterance: String },
}

/// Mock normalizer that returns queued responses in order, whatever the call
pub struct MockNormalizer {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<NormalizerCall>>,
}

#[allow(dead_code)]
impl MockNormalizer {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<NormalizerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: NormalizerCall) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

impl Default for MockNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DestinationNormalizer for MockNormalizer {
    async fn normalize(&self, utterance: &str) -> Result<String, LlmError> {
        self.next(NormalizerCall::Destination(utterance.to_string()))
    }

    async fn normalize_branch(
        &self,
        destination: &str,
        utterance: &str,
    ) -> Result<String, LlmError> {
        self.next(NormalizerCall::Branch {
            destination: destination.to_string(),
            utterance: utterance.to_string(),
        })
    }

    async fn normalize_exit(&self, destination: &str, utterance: &str) -> Result<String, LlmError> {
        self.next(NormalizerCall::Exit {
            destination: destination.to_string(),
            utterance: utterance.to_string(),
        })
    }
}

// ============================================================================
// Mock Station Directory
// ============================================================================

/// Directory that knows a fixed set of station names; everything else is
/// treated like a failed lookup.
pub struct MockStationDirectory {
    stations: HashSet<String>,
    /// Record of all lookups
    pub queries: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockStationDirectory {
    pub fn new() -> Self {
        Self {
            stations: HashSet::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_station(mut self, name: impl Into<String>) -> Self {
        self.stations.insert(name.into());
        self
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockStationDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StationDirectory for MockStationDirectory {
    async fn is_subway_station(&self, name: &str) -> bool {
        self.queries.lock().unwrap().push(name.to_string());
        self.stations.contains(name)
    }
}

// ============================================================================
// Mock Transcriber
// ============================================================================

/// Transcriber returning queued transcripts
pub struct MockTranscriber {
    transcripts: Mutex<VecDeque<Result<String, TranscriptionError>>>,
    /// Byte length of each audio payload received
    pub received: Mutex<Vec<usize>>,
    /// Byte length of each payload transcribed segment by segment
    pub segmented: Mutex<Vec<usize>>,
}

#[allow(dead_code)]
impl MockTranscriber {
    pub fn new() -> Self {
        Self {
            transcripts: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
            segmented: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_transcript(&self, text: impl Into<String>) {
        self.transcripts.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: TranscriptionError) {
        self.transcripts.lock().unwrap().push_back(Err(error));
    }

    pub fn received_lengths(&self) -> Vec<usize> {
        self.received.lock().unwrap().clone()
    }

    pub fn segmented_lengths(&self) -> Vec<usize> {
        self.segmented.lock().unwrap().clone()
    }

    fn next(&self) -> Result<String, TranscriptionError> {
        self.transcripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TranscriptionError::Request("No mock transcript queued".into())))
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechTranscriber for MockTranscriber {
    async fn transcribe(&self, pcm: &[u8]) -> Result<String, TranscriptionError> {
        self.received.lock().unwrap().push(pcm.len());
        self.next()
    }

    async fn transcribe_segments(&self, pcm: &[u8]) -> Result<String, TranscriptionError> {
        self.segmented.lock().unwrap().push(pcm.len());
        self.next()
    }
}

// ============================================================================
// Mock Text Detector
// ============================================================================

/// Detector returning queued texts
pub struct MockTextDetector {
    texts: Mutex<VecDeque<Result<String, DetectionError>>>,
    /// Byte length of each image received
    pub received: Mutex<Vec<usize>>,
}

#[allow(dead_code)]
impl MockTextDetector {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_text(&self, text: impl Into<String>) {
        self.texts.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: DetectionError) {
        self.texts.lock().unwrap().push_back(Err(error));
    }

    pub fn received_lengths(&self) -> Vec<usize> {
        self.received.lock().unwrap().clone()
    }
}

impl Default for MockTextDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextDetector for MockTextDetector {
    async fn detect_text(&self, image: &[u8]) -> Result<String, DetectionError> {
        self.received.lock().unwrap().push(image.len());
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DetectionError::Request("No mock text queued".into())))
    }
}
