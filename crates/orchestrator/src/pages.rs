use std::sync::Arc;
use std::time::Duration;

use github::{GitHubError, RepoHandle, SourceHost};
use retry::{Classification, RetryPolicy};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

const CONFIG_MAX_ATTEMPTS: u32 = 3;
const CONFIG_BASE_DELAY_MS: u64 = 2000;
const POLL_MAX_ATTEMPTS: u32 = 5;
const POLL_BASE_DELAY_MS: u64 = 2000;

#[derive(Debug, Error)]
enum PollError {
    #[error("Pages site is not active yet")]
    Inactive,

    #[error(transparent)]
    Host(#[from] GitHubError),
}

impl PollError {
    fn classify(&self) -> Classification {
        match self {
            Self::Inactive => Classification::Retryable,
            Self::Host(e) => e.classify(),
        }
    }
}

/// Enables static hosting for a repository and waits for it to go live.
///
/// Publishing is best-effort: a timeout is reported as a failure but the
/// repository and commit are not rolled back, since the repository
/// itself is the source of truth.
pub struct PagesPublisher {
    host: Arc<dyn SourceHost>,
    config_policy: RetryPolicy,
    poll_policy: RetryPolicy,
}

impl PagesPublisher {
    pub fn new(host: Arc<dyn SourceHost>) -> Self {
        Self {
            host,
            config_policy: RetryPolicy::new(
                CONFIG_MAX_ATTEMPTS,
                Duration::from_millis(CONFIG_BASE_DELAY_MS),
            ),
            poll_policy: RetryPolicy::new(
                POLL_MAX_ATTEMPTS,
                Duration::from_millis(POLL_BASE_DELAY_MS),
            ),
        }
    }

    pub fn with_config_policy(mut self, policy: RetryPolicy) -> Self {
        self.config_policy = policy;
        self
    }

    pub fn with_poll_policy(mut self, policy: RetryPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Make sure hosting is configured for the default branch at the
    /// site root, then poll until the platform reports the site active.
    pub async fn ensure_published(&self, handle: &RepoHandle) -> Result<String> {
        let current = retry::retry(self.config_policy, "get_pages", GitHubError::classify, || async {
            self.host.get_pages(handle).await
        })
        .await
        .map_err(PipelineError::GitHub)?;

        match current {
            None => {
                retry::retry(self.config_policy, "create_pages", GitHubError::classify, || async {
                    self.host.create_pages(handle).await
                })
                .await
                .map_err(PipelineError::GitHub)?;
            }
            Some(config) if !config.points_at(&handle.default_branch) => {
                info!(repo = %handle.full_name(), "Pages misconfigured, reconciling");
                retry::retry(self.config_policy, "update_pages", GitHubError::classify, || async {
                    self.host.update_pages(handle).await
                })
                .await
                .map_err(PipelineError::GitHub)?;
            }
            Some(_) => {
                debug!(repo = %handle.full_name(), "Pages already configured");
            }
        }

        let polled = retry::retry(
            self.poll_policy,
            "pages_activation",
            PollError::classify,
            || async {
                let pages = self.host.get_pages(handle).await.map_err(PollError::Host)?;
                match pages {
                    Some(config) if config.is_live() => Ok(config
                        .html_url
                        .unwrap_or_else(|| handle.default_pages_url())),
                    _ => Err(PollError::Inactive),
                }
            },
        )
        .await;

        match polled {
            Ok(url) => {
                info!(repo = %handle.full_name(), url = %url, "Pages site is live");
                Ok(url)
            }
            Err(PollError::Inactive) => Err(PipelineError::DeploymentTimeout {
                attempts: self.poll_policy.max_attempts,
            }),
            Err(PollError::Host(e)) => Err(e.into()),
        }
    }
}
