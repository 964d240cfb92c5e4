//! Environment configuration

use crate::llm::DEFAULT_MODEL;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(10);

/// LLM provider configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// OpenAI-compatible API root
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: var("OPENAI_API_KEY").filter(|k| !k.is_empty()),
            base_url: var("OPENAI_BASE_URL"),
            model: var("TAXI_LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parsed(&var, "TAXI_LLM_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE),
            timeout: parsed(&var, "TAXI_LLM_TIMEOUT_SECS")
                .map_or(DEFAULT_LLM_TIMEOUT, Duration::from_secs),
        }
    }
}

/// Whole-service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub llm: LlmConfig,
    pub seoul_api_key: Option<String>,
    pub seoul_base_url: Option<String>,
    pub speech_api_key: Option<String>,
    pub speech_base_url: Option<String>,
    /// Falls back to the speech key
    pub vision_api_key: Option<String>,
    pub vision_base_url: Option<String>,
    /// JSON file overriding the built-in vocabulary
    pub vocabulary_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let speech_api_key = var("GOOGLE_SPEECH_API_KEY").filter(|k| !k.is_empty());
        Self {
            port: parsed(&var, "TAXI_PORT").unwrap_or(DEFAULT_PORT),
            llm: LlmConfig::from_lookup(&var),
            seoul_api_key: var("SEOUL_OPENAPI_KEY").filter(|k| !k.is_empty()),
            seoul_base_url: var("SEOUL_OPENAPI_BASE_URL"),
            vision_api_key: var("GOOGLE_VISION_API_KEY")
                .filter(|k| !k.is_empty())
                .or_else(|| speech_api_key.clone()),
            vision_base_url: var("GOOGLE_VISION_BASE_URL"),
            speech_api_key,
            speech_base_url: var("GOOGLE_SPEECH_BASE_URL"),
            vocabulary_path: var("TAXI_VOCABULARY_PATH").map(PathBuf::from),
        }
    }
}

/// Parse a variable, ignoring (with a warning) values that don't parse
fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    let value = raw.trim().parse().ok();
    if value.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
    }
    value
}
