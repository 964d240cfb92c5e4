//! Dialogue runtime executor

use super::classifier::PlaceClassifier;
use super::traits::{DestinationNormalizer, StationDirectory};
use crate::state_machine::{transition, DialogContext, DialogState, Effect, Event, TransitionError};

/// What one user turn produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Text to say back to the user
    pub reply: String,
    /// Set only on the confirming turn
    pub final_destination: Option<String>,
    pub done: bool,
}

impl TurnOutcome {
    fn push_reply(&mut self, text: String) {
        if self.reply.is_empty() {
            self.reply = text;
        } else {
            self.reply.push('\n');
            self.reply.push_str(&text);
        }
    }
}

/// One session's dialogue, driven a full turn at a time
pub struct DialogRuntime<N, S>
where
    N: DestinationNormalizer,
    S: StationDirectory,
{
    context: DialogContext,
    state: DialogState,
    normalizer: N,
    classifier: PlaceClassifier<S>,
}

impl<N, S> DialogRuntime<N, S>
where
    N: DestinationNormalizer,
    S: StationDirectory,
{
    pub fn new(context: DialogContext, normalizer: N, directory: S) -> Self {
        let classifier = PlaceClassifier::new(directory, context.vocabulary.clone());
        Self {
            context,
            state: DialogState::default(),
            normalizer,
            classifier,
        }
    }

    #[allow(dead_code)] // Used by tests
    pub fn state(&self) -> &DialogState {
        &self.state
    }

    /// Process one utterance and every effect it triggers.
    ///
    /// Collaborator results are fed back as events until the state machine
    /// settles in a state that waits for the user.
    pub async fn handle_turn(&mut self, utterance: &str) -> Result<TurnOutcome, TransitionError> {
        let started_in = self.state.clone();
        let mut outcome = TurnOutcome::default();
        let mut events_to_process = vec![Event::UserUtterance {
            text: utterance.to_string(),
        }];

        while let Some(event) = events_to_process.pop() {
            let result = match transition(&self.state, &self.context, event) {
                Ok(r) => r,
                Err(e) => {
                    // Never leave the session stuck in a busy state
                    if self.state != started_in {
                        tracing::error!(
                            session_id = %self.context.session_id,
                            state = self.state.name(),
                            error = %e,
                            "Dialogue transition failed mid-turn, restoring"
                        );
                        self.state = started_in;
                    }
                    return Err(e);
                }
            };

            tracing::debug!(
                session_id = %self.context.session_id,
                from = self.state.name(),
                to = result.new_state.name(),
                "Dialogue transition"
            );
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect, &mut outcome).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(outcome)
    }

    async fn execute_effect(&self, effect: Effect, outcome: &mut TurnOutcome) -> Option<Event> {
        match effect {
            Effect::NormalizeDestination { utterance } => Some(
                match self.normalizer.normalize(&utterance).await {
                    Ok(raw) => Event::DestinationNormalized { raw },
                    Err(e) => self.normalizer_failed(&e),
                },
            ),
            Effect::ClassifyDestination { destination } => {
                let kind = self.classifier.classify(&destination).await;
                tracing::info!(
                    session_id = %self.context.session_id,
                    destination = %destination,
                    kind = ?kind,
                    "Destination classified"
                );
                Some(Event::DestinationClassified { destination, kind })
            }
            Effect::NormalizeBranch {
                destination,
                utterance,
            } => Some(
                match self
                    .normalizer
                    .normalize_branch(&destination, &utterance)
                    .await
                {
                    Ok(raw) => Event::BranchNormalized { raw },
                    Err(e) => self.normalizer_failed(&e),
                },
            ),
            Effect::NormalizeExit {
                destination,
                utterance,
            } => Some(
                match self.normalizer.normalize_exit(&destination, &utterance).await {
                    Ok(raw) => Event::ExitNormalized { raw },
                    Err(e) => self.normalizer_failed(&e),
                },
            ),
            Effect::Reply { text } => {
                outcome.push_reply(text);
                None
            }
            Effect::Finalize { destination } => {
                tracing::info!(
                    session_id = %self.context.session_id,
                    destination = %destination,
                    "Destination confirmed"
                );
                outcome.final_destination = Some(destination);
                outcome.done = true;
                None
            }
        }
    }

    fn normalizer_failed(&self, error: &crate::llm::LlmError) -> Event {
        tracing::warn!(
            session_id = %self.context.session_id,
            error = %error,
            retryable = error.kind.is_retryable(),
            "Normalizer call failed"
        );
        Event::NormalizerFailed {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::prompts;
    use crate::runtime::testing::{MockNormalizer, MockStationDirectory, NormalizerCall};
    use crate::vocabulary::Vocabulary;
    use std::sync::Arc;

    type TestRuntime = DialogRuntime<Arc<MockNormalizer>, MockStationDirectory>;

    fn runtime(normalizer: &Arc<MockNormalizer>, directory: MockStationDirectory) -> TestRuntime {
        DialogRuntime::new(
            DialogContext::new("test-session", Arc::new(Vocabulary::default())),
            Arc::clone(normalizer),
            directory,
        )
    }

    #[tokio::test]
    async fn test_chain_store_asks_for_branch() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_response("스타벅스");
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        let outcome = rt.handle_turn("스타벅스 가주세요").await.unwrap();

        assert_eq!(outcome.reply, prompts::ask_branch("스타벅스"));
        assert!(!outcome.done);
        assert_eq!(
            rt.state(),
            &DialogState::AwaitingBranch {
                destination: "스타벅스".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_full_branch_dialogue() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_response("스타벅스");
        normalizer.queue_response("강남역점");
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        rt.handle_turn("스타벅스").await.unwrap();
        let outcome = rt.handle_turn("강남역 있는 데요").await.unwrap();
        assert_eq!(outcome.reply, "스타벅스 강남역점(이)가 맞을까요?");

        let outcome = rt.handle_turn("네").await.unwrap();
        assert!(outcome.done);
        assert_eq!(outcome.final_destination.as_deref(), Some("스타벅스 강남역점"));
        assert_eq!(outcome.reply, prompts::start_search("스타벅스 강남역점"));

        assert_eq!(
            normalizer.recorded_calls(),
            vec![
                NormalizerCall::Destination("스타벅스".to_string()),
                NormalizerCall::Branch {
                    destination: "스타벅스".to_string(),
                    utterance: "강남역 있는 데요".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_station_goes_through_exit() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_response("서울역");
        normalizer.queue_response("1번 출구");
        let mut rt = runtime(&normalizer, MockStationDirectory::new().with_station("서울"));

        let outcome = rt.handle_turn("서울역이요").await.unwrap();
        assert_eq!(outcome.reply, prompts::ask_exit("서울역"));

        rt.handle_turn("일번").await.unwrap();
        let outcome = rt.handle_turn("네").await.unwrap();
        assert_eq!(outcome.final_destination.as_deref(), Some("서울역 1번 출구"));
    }

    #[tokio::test]
    async fn test_failed_lookup_goes_straight_to_confirmation() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_response("서울역");
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        let outcome = rt.handle_turn("서울역").await.unwrap();
        assert_eq!(outcome.reply, prompts::confirm_destination("서울역"));

        let outcome = rt.handle_turn("네").await.unwrap();
        assert!(outcome.done);
        assert_eq!(outcome.final_destination.as_deref(), Some("서울역"));
    }

    #[tokio::test]
    async fn test_normalizer_error_reasks() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_error(LlmError::timeout("deadline"));
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        let outcome = rt.handle_turn("어디였더라").await.unwrap();

        assert_eq!(outcome.reply, prompts::ASK_DESTINATION_AGAIN);
        assert_eq!(rt.state(), &DialogState::CollectingDestination);
    }

    #[tokio::test]
    async fn test_sentinel_twice_stays_collecting() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_response("UNKNOWN");
        normalizer.queue_response("UNKNOWN");
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        for _ in 0..2 {
            let outcome = rt.handle_turn("음").await.unwrap();
            assert_eq!(outcome.reply, prompts::ASK_DESTINATION_AGAIN);
            assert_eq!(rt.state(), &DialogState::CollectingDestination);
        }
    }

    #[tokio::test]
    async fn test_empty_utterance_skips_normalizer() {
        let normalizer = Arc::new(MockNormalizer::new());
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        let outcome = rt.handle_turn("").await.unwrap();

        assert_eq!(outcome.reply, prompts::ASK_DESTINATION_AGAIN);
        assert!(normalizer.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_deny_restarts() {
        let normalizer = Arc::new(MockNormalizer::new());
        normalizer.queue_response("경복궁");
        let mut rt = runtime(&normalizer, MockStationDirectory::new());

        rt.handle_turn("경복궁").await.unwrap();
        let outcome = rt.handle_turn("아니요").await.unwrap();

        assert_eq!(outcome.reply, prompts::RESTATE_DESTINATION);
        assert!(!outcome.done);
        assert_eq!(rt.state(), &DialogState::CollectingDestination);
    }
}
