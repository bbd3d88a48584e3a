use retry::Classification;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Authentication rejected by remote: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid work-tree path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VcsError {
    /// Push and clone failures are usually transient network conditions;
    /// credential rejections never are.
    pub fn classify(&self) -> Classification {
        match self {
            Self::AuthenticationFailed(_) | Self::InvalidPath(_) => Classification::Fatal,
            Self::CommandFailed(_) | Self::Io(_) => Classification::Retryable,
        }
    }
}

pub type Result<T> = std::result::Result<T, VcsError>;
