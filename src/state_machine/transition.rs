//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects. Collaborator calls (normalizers, classifier) are
//! requested as effects and come back as events.

use super::state::{DestinationDraft, PlaceKind};
use super::{DialogContext, DialogState, Effect, Event};
use crate::prompts;
use crate::vocabulary::ConfirmationReply;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Characters stripped from both ends of normalizer output
const QUOTES: &[char] = &['"', '\'', '`', '“', '”', '‘', '’'];

static EXIT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("exit number pattern is valid"));

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// The text of the first reply effect, if any
    #[allow(dead_code)] // Used by tests
    pub fn reply(&self) -> Option<&str> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Reply { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Previous turn is still being processed")]
    TurnInProgress,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
#[allow(clippy::too_many_lines)] // One arm per (state, event) pair
pub fn transition(
    state: &DialogState,
    context: &DialogContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let vocabulary = &context.vocabulary;

    match (state, event) {
        // ============================================================
        // Terminal state answers without changing anything
        // ============================================================
        (DialogState::Confirmed { final_destination }, Event::UserUtterance { .. }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::reply(prompts::already_confirmed(final_destination))))
        }

        (state, Event::UserUtterance { .. }) if state.is_busy() => {
            Err(TransitionError::TurnInProgress)
        }

        // ============================================================
        // Destination
        // ============================================================

        // Blank input (e.g. failed audio decode) is unresolvable without asking the LLM
        (DialogState::CollectingDestination, Event::UserUtterance { text })
            if text.trim().is_empty() =>
        {
            Ok(TransitionResult::new(DialogState::CollectingDestination)
                .with_effect(Effect::reply(prompts::ASK_DESTINATION_AGAIN)))
        }

        (DialogState::CollectingDestination, Event::UserUtterance { text }) => {
            Ok(TransitionResult::new(DialogState::NormalizingDestination)
                .with_effect(Effect::normalize_destination(text)))
        }

        (DialogState::NormalizingDestination, Event::DestinationNormalized { raw }) => {
            let destination = clean_normalizer_output(&raw);
            if vocabulary.is_unresolved(&destination) {
                return Ok(TransitionResult::new(DialogState::CollectingDestination)
                    .with_effect(Effect::reply(prompts::ASK_DESTINATION_AGAIN)));
            }
            Ok(TransitionResult::new(DialogState::ClassifyingDestination {
                destination: destination.clone(),
            })
            .with_effect(Effect::classify(destination)))
        }

        (DialogState::NormalizingDestination, Event::NormalizerFailed { .. }) => {
            Ok(TransitionResult::new(DialogState::CollectingDestination)
                .with_effect(Effect::reply(prompts::ASK_DESTINATION_AGAIN)))
        }

        (
            DialogState::ClassifyingDestination { destination },
            Event::DestinationClassified {
                destination: classified,
                kind,
            },
        ) if *destination == classified => Ok(match kind {
            PlaceKind::SubwayStation => TransitionResult::new(DialogState::AwaitingExit {
                destination: classified.clone(),
            })
            .with_effect(Effect::reply(prompts::ask_exit(&classified))),
            PlaceKind::ChainStore => TransitionResult::new(DialogState::AwaitingBranch {
                destination: classified.clone(),
            })
            .with_effect(Effect::reply(prompts::ask_branch(&classified))),
            PlaceKind::SubwayStationWithExit | PlaceKind::Plain => {
                let reply = prompts::confirm_destination(&classified);
                TransitionResult::new(DialogState::AwaitingConfirmation {
                    draft: DestinationDraft::new(classified),
                })
                .with_effect(Effect::reply(reply))
            }
        }),

        // ============================================================
        // Branch
        // ============================================================
        (DialogState::AwaitingBranch { destination }, Event::UserUtterance { text }) => {
            if text.trim().is_empty() {
                return Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::ASK_BRANCH_AGAIN)));
            }
            Ok(TransitionResult::new(DialogState::NormalizingBranch {
                destination: destination.clone(),
            })
            .with_effect(Effect::NormalizeBranch {
                destination: destination.clone(),
                utterance: text,
            }))
        }

        (DialogState::NormalizingBranch { destination }, Event::BranchNormalized { raw }) => {
            let cleaned = clean_normalizer_output(&raw);
            // The normalizer sometimes repeats the chain name
            let branch = cleaned
                .strip_prefix(destination.as_str())
                .map_or(cleaned.as_str(), str::trim)
                .to_string();
            if vocabulary.is_unresolved(&branch) {
                return Ok(TransitionResult::new(DialogState::AwaitingBranch {
                    destination: destination.clone(),
                })
                .with_effect(Effect::reply(prompts::ASK_BRANCH_AGAIN)));
            }
            let draft = DestinationDraft::new(destination.clone()).with_branch(branch);
            let reply = prompts::confirm_destination(&draft.assemble());
            Ok(TransitionResult::new(DialogState::AwaitingConfirmation { draft })
                .with_effect(Effect::reply(reply)))
        }

        (DialogState::NormalizingBranch { destination }, Event::NormalizerFailed { .. }) => {
            Ok(TransitionResult::new(DialogState::AwaitingBranch {
                destination: destination.clone(),
            })
            .with_effect(Effect::reply(prompts::ASK_BRANCH_AGAIN)))
        }

        // ============================================================
        // Exit
        // ============================================================
        (DialogState::AwaitingExit { destination }, Event::UserUtterance { text }) => {
            if text.trim().is_empty() {
                return Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::ASK_EXIT_AGAIN)));
            }
            Ok(TransitionResult::new(DialogState::NormalizingExit {
                destination: destination.clone(),
            })
            .with_effect(Effect::NormalizeExit {
                destination: destination.clone(),
                utterance: text,
            }))
        }

        (DialogState::NormalizingExit { destination }, Event::ExitNormalized { raw }) => {
            let Some(exit) = canonical_exit(&clean_normalizer_output(&raw)) else {
                return Ok(TransitionResult::new(DialogState::AwaitingExit {
                    destination: destination.clone(),
                })
                .with_effect(Effect::reply(prompts::ASK_EXIT_AGAIN)));
            };
            let draft = DestinationDraft::new(destination.clone()).with_exit(exit);
            let reply = prompts::confirm_destination(&draft.assemble());
            Ok(TransitionResult::new(DialogState::AwaitingConfirmation { draft })
                .with_effect(Effect::reply(reply)))
        }

        (DialogState::NormalizingExit { destination }, Event::NormalizerFailed { .. }) => {
            Ok(TransitionResult::new(DialogState::AwaitingExit {
                destination: destination.clone(),
            })
            .with_effect(Effect::reply(prompts::ASK_EXIT_AGAIN)))
        }

        // ============================================================
        // Confirmation
        // ============================================================
        (DialogState::AwaitingConfirmation { draft }, Event::UserUtterance { text }) => {
            match vocabulary.classify_reply(&text) {
                ConfirmationReply::Affirm => {
                    let final_destination = draft.assemble();
                    Ok(TransitionResult::new(DialogState::Confirmed {
                        final_destination: final_destination.clone(),
                    })
                    .with_effect(Effect::reply(prompts::start_search(&final_destination)))
                    .with_effect(Effect::Finalize {
                        destination: final_destination,
                    }))
                }
                ConfirmationReply::Deny => {
                    Ok(TransitionResult::new(DialogState::CollectingDestination)
                        .with_effect(Effect::reply(prompts::RESTATE_DESTINATION)))
                }
                ConfirmationReply::Unclear => Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::NOT_UNDERSTOOD))),
            }
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {event:?}",
            state.name()
        ))),
    }
}

// Helper functions

/// Strip a leading `label:` prefix, surrounding quotes and whitespace
pub fn clean_normalizer_output(raw: &str) -> String {
    let after_label = raw
        .rsplit(|c: char| c == ':' || c == '：')
        .next()
        .unwrap_or(raw);
    after_label
        .trim()
        .trim_matches(QUOTES)
        .trim()
        .to_string()
}

/// Canonicalize an exit answer to `N번 출구`
pub fn canonical_exit(text: &str) -> Option<String> {
    let number: u32 = EXIT_NUMBER.find(text)?.as_str().parse().ok()?;
    Some(format!("{number}번 출구"))
}
