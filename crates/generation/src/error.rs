use retry::Classification;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Model rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("Model API authentication failed: {0}")]
    Authentication(String),

    #[error("Model output did not match the expected schema: {0}")]
    MalformedOutput(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenerationError {
    /// Generation calls are rate-limited and occasionally return garbage,
    /// so both count as retryable. Auth and other 4xx responses abort.
    pub fn classify(&self) -> Classification {
        match self {
            Self::RateLimited { .. } => Classification::Retryable,
            Self::MalformedOutput(_) => Classification::Retryable,
            Self::Http(_) => Classification::Retryable,
            Self::Api { status_code, .. } => match status_code {
                Some(code) if *code >= 500 => Classification::Retryable,
                Some(_) => Classification::Fatal,
                None => Classification::Retryable,
            },
            Self::Authentication(_) => Classification::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            GenerationError::RateLimited { retry_after: None }.classify(),
            Classification::Retryable
        );
        assert_eq!(
            GenerationError::Api {
                message: "boom".to_string(),
                status_code: Some(503),
            }
            .classify(),
            Classification::Retryable
        );
        assert_eq!(
            GenerationError::Api {
                message: "unprocessable".to_string(),
                status_code: Some(422),
            }
            .classify(),
            Classification::Fatal
        );
        assert_eq!(
            GenerationError::Authentication("bad key".to_string()).classify(),
            Classification::Fatal
        );
        assert_eq!(
            GenerationError::MalformedOutput("not json".to_string()).classify(),
            Classification::Retryable
        );
    }
}
