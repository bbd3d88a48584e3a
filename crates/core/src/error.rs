use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid task slug '{0}': only lowercase letters, digits, '-' and '_' are allowed")]
    InvalidSlug(String),

    #[error("Invalid round {0}: rounds start at 1")]
    InvalidRound(u32),

    #[error("Validation error: {0}")]
    Validation(String),
}
