use serde::{Deserialize, Serialize};

use crate::domain::task::{DeploymentResult, TaskRequest};

/// The JSON body posted to the caller's evaluation URL when a task
/// reaches a terminal state.
///
/// The success shape carries the three deployment fields; the failure
/// shape carries `error` instead and omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub email: String,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallbackPayload {
    pub fn success(request: &TaskRequest, deployment: &DeploymentResult) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            repo_url: Some(deployment.repo_url.clone()),
            commit_sha: Some(deployment.commit_sha.clone()),
            pages_url: Some(deployment.pages_url.clone()),
            error: None,
        }
    }

    pub fn failure(request: &TaskRequest, reason: impl Into<String>) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            repo_url: None,
            commit_sha: None,
            pages_url: None,
            error: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
