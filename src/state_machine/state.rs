//! Dialogue state types

use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Destination Draft
// ============================================================================

/// A destination assembled from the slots collected so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationDraft {
    pub place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,
}

impl DestinationDraft {
    pub fn new(place: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            branch: None,
            exit: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_exit(mut self, exit: impl Into<String>) -> Self {
        self.exit = Some(exit.into());
        self
    }

    /// Join the present segments with single spaces
    pub fn assemble(&self) -> String {
        [Some(self.place.as_str()), self.branch.as_deref(), self.exit.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// Place Classification
// ============================================================================

/// How a normalized destination was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    /// Subway station with no exit given yet
    SubwayStation,
    /// Subway station that already names an exit
    SubwayStationWithExit,
    /// Franchise that needs a branch
    ChainStore,
    /// Anything else
    Plain,
}

// ============================================================================
// Dialogue State
// ============================================================================

/// Dialogue state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogState {
    /// Waiting for the user to name a destination
    #[default]
    CollectingDestination,

    /// Destination normalizer call in flight
    NormalizingDestination,

    /// Station/chain classification in flight
    ClassifyingDestination { destination: String },

    /// Chain store recognized, waiting for the branch
    AwaitingBranch { destination: String },

    /// Branch normalizer call in flight
    NormalizingBranch { destination: String },

    /// Subway station recognized, waiting for the exit number
    AwaitingExit { destination: String },

    /// Exit normalizer call in flight
    NormalizingExit { destination: String },

    /// All slots filled, waiting for yes/no
    AwaitingConfirmation { draft: DestinationDraft },

    /// Destination confirmed (terminal)
    Confirmed { final_destination: String },
}

impl DialogState {
    /// Check if this is the terminal state
    #[allow(dead_code)] // API completeness
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogState::Confirmed { .. })
    }

    /// Check if a collaborator call is in flight for the current turn
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            DialogState::NormalizingDestination
                | DialogState::ClassifyingDestination { .. }
                | DialogState::NormalizingBranch { .. }
                | DialogState::NormalizingExit { .. }
        )
    }

    /// The destination collected so far, if any
    #[allow(dead_code)] // API completeness
    pub fn destination(&self) -> Option<&str> {
        match self {
            DialogState::CollectingDestination | DialogState::NormalizingDestination => None,
            DialogState::ClassifyingDestination { destination }
            | DialogState::AwaitingBranch { destination }
            | DialogState::NormalizingBranch { destination }
            | DialogState::AwaitingExit { destination }
            | DialogState::NormalizingExit { destination } => Some(destination),
            DialogState::AwaitingConfirmation { draft } => Some(&draft.place),
            DialogState::Confirmed { final_destination } => Some(final_destination),
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::CollectingDestination => "collecting_destination",
            DialogState::NormalizingDestination => "normalizing_destination",
            DialogState::ClassifyingDestination { .. } => "classifying_destination",
            DialogState::AwaitingBranch { .. } => "awaiting_branch",
            DialogState::NormalizingBranch { .. } => "normalizing_branch",
            DialogState::AwaitingExit { .. } => "awaiting_exit",
            DialogState::NormalizingExit { .. } => "normalizing_exit",
            DialogState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            DialogState::Confirmed { .. } => "confirmed",
        }
    }
}

/// Context for a dialogue session (immutable configuration)
#[derive(Debug, Clone)]
pub struct DialogContext {
    pub session_id: String,
    pub vocabulary: Arc<Vocabulary>,
}

impl DialogContext {
    pub fn new(session_id: impl Into<String>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            session_id: session_id.into(),
            vocabulary,
        }
    }
}
