//! Runtime for executing dialogues
//!
//! Owns the live sessions and wires each one to the shared collaborators.

mod classifier;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use classifier::PlaceClassifier;
pub use executor::{DialogRuntime, TurnOutcome};
pub use traits::*;

use crate::state_machine::DialogContext;
use crate::vocabulary::Vocabulary;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Type alias for production runtime with shared collaborators
pub type ProductionRuntime =
    DialogRuntime<Arc<dyn DestinationNormalizer>, Arc<dyn StationDirectory>>;

/// Handle to a live session; turns are serialized by the mutex
pub type SessionHandle = Arc<Mutex<ProductionRuntime>>;

/// Manager for all dialogue sessions
pub struct SessionManager {
    normalizer: Arc<dyn DestinationNormalizer>,
    directory: Arc<dyn StationDirectory>,
    vocabulary: Arc<Vocabulary>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(
        normalizer: Arc<dyn DestinationNormalizer>,
        directory: Arc<dyn StationDirectory>,
        vocabulary: Arc<Vocabulary>,
    ) -> Self {
        Self {
            normalizer,
            directory,
            vocabulary,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the session for `session_id`, starting a fresh dialogue if none exists
    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(session_id) {
                return Arc::clone(handle);
            }
        }

        let mut sessions = self.sessions.write().await;
        // Another task may have created it while we waited for the write lock
        if let Some(handle) = sessions.get(session_id) {
            return Arc::clone(handle);
        }

        let runtime = DialogRuntime::new(
            DialogContext::new(session_id, Arc::clone(&self.vocabulary)),
            Arc::clone(&self.normalizer),
            Arc::clone(&self.directory),
        );
        let handle = Arc::new(Mutex::new(runtime));
        sessions.insert(session_id.to_string(), Arc::clone(&handle));
        tracing::info!(session_id = %session_id, "Dialogue session created");
        handle
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "Dialogue session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[allow(dead_code)] // Paired with len()
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
