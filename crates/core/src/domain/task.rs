use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

const MAX_SLUG_LEN: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Received,
    Generating,
    SafetyCheck,
    Committing,
    Deploying,
    Notifying,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Generating => "generating",
            Self::SafetyCheck => "safety_check",
            Self::Committing => "committing",
            Self::Deploying => "deploying",
            Self::Notifying => "notifying",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "received" => Some(Self::Received),
            "generating" => Some(Self::Generating),
            "safety_check" => Some(Self::SafetyCheck),
            "committing" => Some(Self::Committing),
            "deploying" => Some(Self::Deploying),
            "notifying" => Some(Self::Notifying),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// An attachment handed in with a task submission.
///
/// `url` is either a regular reference or a `data:` URI carrying the
/// content inline (base64).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

impl Attachment {
    pub fn is_inline(&self) -> bool {
        self.url.starts_with("data:")
    }
}

/// A validated task submission. Immutable once accepted.
///
/// `task` doubles as the remote repository slug, so it must stay
/// filesystem- and URL-safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub email: String,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub brief: String,
    pub evaluation_url: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl TaskRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_slug(&self.task)?;
        if self.round == 0 {
            return Err(CoreError::InvalidRound(self.round));
        }
        if self.evaluation_url.trim().is_empty() {
            return Err(CoreError::Validation(
                "evaluation_url cannot be empty".to_string(),
            ));
        }
        if self.brief.trim().is_empty() {
            return Err(CoreError::Validation("brief cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn is_update(&self) -> bool {
        self.round >= 2
    }
}

pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::InvalidSlug(slug.to_string()));
    }
    let safe = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !safe || slug.starts_with('-') {
        return Err(CoreError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Produced only on full pipeline success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

/// The last task seen by the process, with its pipeline status.
///
/// Overwritten by each new task; diagnostic only, no persistence across
/// restarts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskRecord {
    pub email: String,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub status: TaskStatus,
    pub received_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn from_request(request: &TaskRequest) -> Self {
        let now = Utc::now();
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            status: TaskStatus::Received,
            received_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
