use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Generation failed: {0}")]
    Generation(#[from] generation::GenerationError),

    #[error("Source hosting error: {0}")]
    GitHub(#[from] github::GitHubError),

    #[error("Working tree error: {0}")]
    Vcs(#[from] vcs::VcsError),

    #[error("Pages deployment did not activate after {attempts} attempts")]
    DeploymentTimeout { attempts: u32 },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
