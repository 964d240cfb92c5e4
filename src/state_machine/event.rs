//! Events that can occur in a dialogue

use super::state::PlaceKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserUtterance { text: String },

    // Normalizer events (raw output, cleaned by the transition)
    DestinationNormalized { raw: String },
    BranchNormalized { raw: String },
    ExitNormalized { raw: String },
    NormalizerFailed { message: String },

    // Classifier events
    DestinationClassified {
        destination: String,
        kind: PlaceKind,
    },
}
