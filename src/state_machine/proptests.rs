//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::vocabulary::Vocabulary;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> DialogContext {
    DialogContext::new("test-session", Arc::new(Vocabulary::default()))
}

fn utterance(text: impl Into<String>) -> Event {
    Event::UserUtterance { text: text.into() }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// A slot value with optional padding but no inner runs of spaces
fn arb_segment() -> impl Strategy<Value = String> {
    " {0,2}[가-힣a-z0-9]{0,6} {0,2}"
}

fn arb_draft() -> impl Strategy<Value = DestinationDraft> {
    (
        " {0,2}[가-힣]{1,6} {0,2}",
        proptest::option::of(arb_segment()),
        proptest::option::of(arb_segment()),
    )
        .prop_map(|(place, branch, exit)| DestinationDraft {
            place,
            branch,
            exit,
        })
}

fn arb_affirm() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("네".to_string()),
        Just("맞아요".to_string()),
        Just("응".to_string()),
        Just("그래 가자".to_string()),
        Just("네 맞습니다".to_string()),
    ]
}

fn arb_deny() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("아니".to_string()),
        Just("아니요".to_string()),
        Just("아뇨".to_string()),
        Just("아녀".to_string()),
        Just("노".to_string()),
    ]
}

fn arb_destination() -> impl Strategy<Value = String> {
    "[가-힣]{1,8}"
}

fn arb_idle_state() -> impl Strategy<Value = DialogState> {
    prop_oneof![
        Just(DialogState::CollectingDestination),
        arb_destination().prop_map(|destination| DialogState::AwaitingBranch { destination }),
        arb_destination().prop_map(|destination| DialogState::AwaitingExit { destination }),
        arb_draft().prop_map(|draft| DialogState::AwaitingConfirmation { draft }),
        arb_destination().prop_map(|final_destination| DialogState::Confirmed {
            final_destination
        }),
    ]
}

fn arb_busy_state() -> impl Strategy<Value = DialogState> {
    prop_oneof![
        Just(DialogState::NormalizingDestination),
        arb_destination()
            .prop_map(|destination| DialogState::ClassifyingDestination { destination }),
        arb_destination().prop_map(|destination| DialogState::NormalizingBranch { destination }),
        arb_destination().prop_map(|destination| DialogState::NormalizingExit { destination }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Assembled destinations never carry stray whitespace
    #[test]
    fn prop_assemble_has_no_stray_spaces(draft in arb_draft()) {
        let assembled = draft.assemble();
        prop_assert!(!assembled.contains("  "));
        prop_assert_eq!(assembled.trim(), assembled.as_str());
        prop_assert!(assembled.contains(draft.place.trim()));
    }

    /// A positive confirmation finishes with exactly the assembled draft
    #[test]
    fn prop_affirm_confirms_assembled_draft(draft in arb_draft(), reply in arb_affirm()) {
        let expected = draft.assemble();
        let result = transition(
            &DialogState::AwaitingConfirmation { draft },
            &test_context(),
            utterance(reply),
        ).unwrap();

        prop_assert!(result.new_state.is_terminal());
        prop_assert_eq!(result.new_state.destination(), Some(expected.as_str()));
        let finalized = result.effects.contains(&Effect::Finalize { destination: expected });
        prop_assert!(finalized);
    }

    /// A negative confirmation always starts over with nothing retained
    #[test]
    fn prop_deny_resets_dialogue(draft in arb_draft(), reply in arb_deny()) {
        let result = transition(
            &DialogState::AwaitingConfirmation { draft },
            &test_context(),
            utterance(reply),
        ).unwrap();

        prop_assert_eq!(result.new_state, DialogState::CollectingDestination);
        let finalized = result.effects.iter().any(|e| matches!(e, Effect::Finalize { .. }));
        prop_assert!(!finalized);
    }

    /// The terminal state never changes and never finalizes twice
    #[test]
    fn prop_confirmed_is_stable(destination in arb_destination(), text in ".{0,20}") {
        let state = DialogState::Confirmed { final_destination: destination };
        let result = transition(&state, &test_context(), utterance(text)).unwrap();

        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(result.reply().is_some());
    }

    /// Any utterance in an idle state yields a new state and never panics
    #[test]
    fn prop_idle_states_accept_any_utterance(state in arb_idle_state(), text in ".{0,40}") {
        let result = transition(&state, &test_context(), utterance(text));
        prop_assert!(result.is_ok());

        let result = result.unwrap();
        prop_assert!(!result.effects.is_empty());
        // Either a collaborator call is pending or the user gets an answer
        prop_assert!(result.new_state.is_busy() || result.reply().is_some());
    }

    /// Utterances are refused while a collaborator call is in flight
    #[test]
    fn prop_busy_states_reject_utterances(state in arb_busy_state(), text in ".{0,20}") {
        let result = transition(&state, &test_context(), utterance(text));
        prop_assert_eq!(result.unwrap_err(), TransitionError::TurnInProgress);
    }

    /// Unresolved normalizer output never leaves the collecting loop
    #[test]
    fn prop_unresolved_destination_reasks(rounds in 1usize..4) {
        let context = test_context();
        let mut state = DialogState::CollectingDestination;

        for _ in 0..rounds {
            let result = transition(&state, &context, utterance("음...")).unwrap();
            prop_assert_eq!(&result.new_state, &DialogState::NormalizingDestination);

            let result = transition(
                &result.new_state,
                &context,
                Event::DestinationNormalized { raw: "UNKNOWN".to_string() },
            ).unwrap();
            prop_assert_eq!(&result.new_state, &DialogState::CollectingDestination);
            state = result.new_state;
        }
    }

    /// Any reply containing a digit canonicalizes to a single exit number
    #[test]
    fn prop_exit_canonicalization(n in 0u32..200, prefix in "[가-힣 ]{0,4}", suffix in "[가-힣 ]{0,4}") {
        let exit = canonical_exit(&format!("{prefix}{n}{suffix}"));
        prop_assert_eq!(exit, Some(format!("{n}번 출구")));
    }
}
