//! Lookup tables the dialogue relies on
//!
//! Chain-store names, yes/no surface forms and the markers used to read
//! normalizer output. Defaults are compiled in; a JSON file can replace any
//! subset of them (see `TAXI_VOCABULARY_PATH`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading a vocabulary file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read vocabulary file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid vocabulary file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid vocabulary: {0}")]
    Invalid(String),
}

/// Surface strings for each confirmation category.
///
/// Matching is substring containment; `affirm` is checked before `deny`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseVocabulary {
    pub affirm: Vec<String>,
    pub deny: Vec<String>,
}

impl Default for ResponseVocabulary {
    fn default() -> Self {
        Self {
            affirm: to_strings(&["네", "맞아", "응", "어", "마자", "마저", "그래"]),
            deny: to_strings(&["아니", "아녀", "아뇨", "아니야", "노"]),
        }
    }
}

/// How a confirmation utterance was understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    Affirm,
    Deny,
    Unclear,
}

/// All configurable vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Franchise names that need a branch. Exact membership.
    pub chain_stores: Vec<String>,
    pub responses: ResponseVocabulary,
    /// Normalizer output meaning "no destination found"
    pub unresolved_sentinel: String,
    /// Any normalizer output containing this is treated as unresolved
    pub none_marker: String,
    /// Suffix marking a subway station name ("역")
    pub station_suffix: String,
    /// Marks an explicit exit number ("출구")
    pub exit_marker: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            chain_stores: to_strings(&[
                "스타벅스",
                "맥도날드",
                "버거킹",
                "이디야",
                "올리브영",
                "CU",
                "GS25",
                "더현대",
                "현대백화점",
                "롯데백화점",
                "롯데월드",
                "서브웨이",
                "투썸플레이스",
                "투썸",
                "올드페리도넛",
                "스타필드",
            ]),
            responses: ResponseVocabulary::default(),
            unresolved_sentinel: "UNKNOWN".to_string(),
            none_marker: "없음".to_string(),
            station_suffix: "역".to_string(),
            exit_marker: "출구".to_string(),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let vocabulary: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.responses.affirm.iter().any(String::is_empty)
            || self.responses.deny.iter().any(String::is_empty)
        {
            // An empty surface form would match every utterance
            return Err(ConfigError::Invalid(
                "response surface forms must be non-empty".to_string(),
            ));
        }
        if self.station_suffix.is_empty() || self.exit_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "station_suffix and exit_marker must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_chain_store(&self, name: &str) -> bool {
        self.chain_stores.iter().any(|store| store == name)
    }

    /// Classify a confirmation utterance; affirmative forms win over negative ones.
    pub fn classify_reply(&self, utterance: &str) -> ConfirmationReply {
        if self
            .responses
            .affirm
            .iter()
            .any(|surface| utterance.contains(surface.as_str()))
        {
            ConfirmationReply::Affirm
        } else if self
            .responses
            .deny
            .iter()
            .any(|surface| utterance.contains(surface.as_str()))
        {
            ConfirmationReply::Deny
        } else {
            ConfirmationReply::Unclear
        }
    }

    /// True when cleaned normalizer output carries no usable value
    pub fn is_unresolved(&self, cleaned: &str) -> bool {
        cleaned.is_empty()
            || cleaned == self.unresolved_sentinel
            || (!self.none_marker.is_empty() && cleaned.contains(self.none_marker.as_str()))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
