use retry::Classification;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Repository not found: {owner}/{repo}")]
    RepoNotFound { owner: String, repo: String },

    #[error("Repository already exists: {owner}/{repo}")]
    RepoAlreadyExists { owner: String, repo: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl GitHubError {
    pub fn classify(&self) -> Classification {
        match self {
            Self::RateLimited | Self::Network(_) => Classification::Retryable,
            Self::Api { status_code, .. } => match status_code {
                Some(code) if *code >= 500 => Classification::Retryable,
                Some(_) => Classification::Fatal,
                None => Classification::Retryable,
            },
            Self::Authentication(_)
            | Self::RepoNotFound { .. }
            | Self::RepoAlreadyExists { .. }
            | Self::Config(_) => Classification::Fatal,
        }
    }
}

impl From<octocrab::Error> for GitHubError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                if status == 401 || status == 403 {
                    if source.message.contains("rate limit") {
                        GitHubError::RateLimited
                    } else {
                        GitHubError::Authentication(source.message.clone())
                    }
                } else if status == 429 {
                    GitHubError::RateLimited
                } else {
                    GitHubError::Api {
                        message: source.message.clone(),
                        status_code: Some(status),
                    }
                }
            }
            _ => GitHubError::Network(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;
