//! Effects produced by state transitions

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the destination normalizer on an utterance
    NormalizeDestination { utterance: String },

    /// Classify a normalized destination (subway lookup, chain list)
    ClassifyDestination { destination: String },

    /// Run the branch normalizer on an utterance about `destination`
    NormalizeBranch {
        destination: String,
        utterance: String,
    },

    /// Run the exit-number normalizer on an utterance about `destination`
    NormalizeExit {
        destination: String,
        utterance: String,
    },

    /// Say something to the user
    Reply { text: String },

    /// Hand the confirmed destination downstream and end the session
    Finalize { destination: String },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }

    pub fn normalize_destination(utterance: impl Into<String>) -> Self {
        Effect::NormalizeDestination {
            utterance: utterance.into(),
        }
    }

    pub fn classify(destination: impl Into<String>) -> Self {
        Effect::ClassifyDestination {
            destination: destination.into(),
        }
    }
}
