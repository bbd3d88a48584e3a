use std::sync::Arc;

use orchestrator::{StoreSnapshot, TaskOrchestrator};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TaskOrchestrator>,
    submission_secret: String,
}

impl AppState {
    pub fn new(orchestrator: Arc<TaskOrchestrator>, submission_secret: impl Into<String>) -> Self {
        Self {
            orchestrator,
            submission_secret: submission_secret.into(),
        }
    }

    pub fn secret_matches(&self, candidate: &str) -> bool {
        // Byte-wise compare without an early exit on the first mismatch.
        candidate.len() == self.submission_secret.len()
            && candidate
                .bytes()
                .zip(self.submission_secret.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.orchestrator.store().snapshot()
    }
}
