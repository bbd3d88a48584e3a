use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret checked against the `secret` field of submissions.
    pub submission_secret: String,
    pub github_token: String,
    pub github_owner: String,
    pub model_api_key: String,
    pub model_base_url: String,
    pub model_id: String,
    pub bind_addr: SocketAddr,
    /// Parent directory for the throwaway working trees used per publish.
    pub workspace_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3001".to_string());
        let bind_addr = bind_addr.parse().map_err(|e| ConfigError::Invalid {
            name: "BIND_ADDR",
            reason: format!("{}", e),
        })?;

        let workspace_dir = lookup("WORKSPACE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("pagewright"));

        Ok(Self {
            submission_secret: required("SUBMISSION_SECRET")?,
            github_token: required("GITHUB_TOKEN")?,
            github_owner: required("GITHUB_OWNER")?,
            model_api_key: required("MODEL_API_KEY")?,
            model_base_url: lookup("MODEL_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model_id: lookup("MODEL_ID").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            bind_addr,
            workspace_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> HashMap<String, String> {
        vars(&[
            ("SUBMISSION_SECRET", "s3cret"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("GITHUB_OWNER", "octo"),
            ("MODEL_API_KEY", "sk-x"),
        ])
    }

    #[test]
    fn test_defaults_applied() {
        let env = minimal();
        let settings = Settings::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(settings.bind_addr.port(), 3001);
        assert_eq!(settings.model_base_url, "https://api.openai.com/v1");
        assert_eq!(settings.model_id, "gpt-4o-mini");
        assert!(settings.workspace_dir.ends_with("pagewright"));
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let mut env = minimal();
        env.remove("SUBMISSION_SECRET");

        let err = Settings::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUBMISSION_SECRET")));
    }

    #[test]
    fn test_invalid_bind_addr_is_rejected() {
        let mut env = minimal();
        env.insert("BIND_ADDR".to_string(), "not-an-addr".to_string());

        let err = Settings::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }

    #[test]
    fn test_overrides_win() {
        let mut env = minimal();
        env.insert("BIND_ADDR".to_string(), "127.0.0.1:8080".to_string());
        env.insert("MODEL_ID".to_string(), "gpt-4o".to_string());

        let settings = Settings::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(settings.model_id, "gpt-4o");
    }
}
