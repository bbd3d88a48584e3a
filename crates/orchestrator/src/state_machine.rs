use pagewright_core::TaskStatus;

use crate::error::{PipelineError, Result};

/// Legal status progression for one task. Round 1 has no prior artifact,
/// so the safety check stage is skipped entirely.
pub struct PipelineStateMachine {
    round: u32,
}

impl PipelineStateMachine {
    pub fn new(round: u32) -> Self {
        Self { round }
    }

    pub fn validate_transition(&self, from: &TaskStatus, to: &TaskStatus) -> Result<()> {
        let allowed = self.allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(PipelineError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(&self, from: &TaskStatus) -> Vec<TaskStatus> {
        match from {
            TaskStatus::Received => vec![TaskStatus::Generating, TaskStatus::Failed],
            TaskStatus::Generating => {
                if self.round >= 2 {
                    vec![TaskStatus::SafetyCheck, TaskStatus::Failed]
                } else {
                    vec![TaskStatus::Committing, TaskStatus::Failed]
                }
            }
            TaskStatus::SafetyCheck => vec![TaskStatus::Committing, TaskStatus::Failed],
            TaskStatus::Committing => vec![TaskStatus::Deploying, TaskStatus::Failed],
            TaskStatus::Deploying => vec![TaskStatus::Notifying, TaskStatus::Failed],
            TaskStatus::Notifying => vec![TaskStatus::Done, TaskStatus::Failed],
            TaskStatus::Done => vec![],
            TaskStatus::Failed => vec![],
        }
    }

    pub fn can_transition(&self, from: &TaskStatus, to: &TaskStatus) -> bool {
        self.validate_transition(from, to).is_ok()
    }

    /// Next stage on the happy path.
    pub fn next_status(&self, current: &TaskStatus) -> Option<TaskStatus> {
        match current {
            TaskStatus::Received => Some(TaskStatus::Generating),
            TaskStatus::Generating => {
                if self.round >= 2 {
                    Some(TaskStatus::SafetyCheck)
                } else {
                    Some(TaskStatus::Committing)
                }
            }
            TaskStatus::SafetyCheck => Some(TaskStatus::Committing),
            TaskStatus::Committing => Some(TaskStatus::Deploying),
            TaskStatus::Deploying => Some(TaskStatus::Notifying),
            TaskStatus::Notifying => Some(TaskStatus::Done),
            TaskStatus::Done => None,
            TaskStatus::Failed => None,
        }
    }
}
