use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use github::{GitHubError, RepoHandle, SourceHost};
use pagewright_core::{GenerationResult, ENTRY_FILE};
use retry::RetryPolicy;
use tracing::{info, warn};
use uuid::Uuid;
use vcs::{VcsError, WorkTree};

use crate::error::Result;

const NETWORK_MAX_ATTEMPTS: u32 = 3;
const NETWORK_BASE_DELAY_MS: u64 = 2000;

/// Creates or resolves the remote repository for a slug and publishes
/// generated file sets into it.
///
/// Each publish uses a fresh working tree under `workspace_base`,
/// removed again afterwards. Update rounds force-push: the in-memory
/// view of the remote may be stale across concurrent updates to the
/// same slug, and last-writer-wins is the accepted consistency model.
pub struct RepositoryManager {
    host: Arc<dyn SourceHost>,
    tree: Arc<dyn WorkTree>,
    workspace_base: PathBuf,
    policy: RetryPolicy,
}

impl RepositoryManager {
    pub fn new(host: Arc<dyn SourceHost>, tree: Arc<dyn WorkTree>, workspace_base: PathBuf) -> Self {
        Self {
            host,
            tree,
            workspace_base,
            policy: RetryPolicy::new(
                NETWORK_MAX_ATTEMPTS,
                Duration::from_millis(NETWORK_BASE_DELAY_MS),
            ),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Round 1 creates the repository, absorbing an already-exists
    /// conflict so resubmissions stay idempotent. Round >= 2 resolves
    /// the existing repository; absence is fatal and must never fall
    /// back to creation.
    pub async fn ensure_repository(&self, slug: &str, round: u32) -> Result<RepoHandle> {
        if round >= 2 {
            let handle = retry::retry(self.policy, "get_repository", GitHubError::classify, || async {
                self.host.get_repository(slug).await
            })
            .await?;
            return Ok(handle);
        }

        let created = retry::retry(self.policy, "create_repository", GitHubError::classify, || async {
            self.host.create_repository(slug).await
        })
        .await;

        match created {
            Ok(handle) => Ok(handle),
            Err(GitHubError::RepoAlreadyExists { owner, repo }) => {
                info!("Repository {}/{} already exists, reusing it", owner, repo);
                let handle = retry::retry(self.policy, "get_repository", GitHubError::classify, || async {
                    self.host.get_repository(slug).await
                })
                .await?;
                Ok(handle)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current content of the deployed entry file, if any.
    pub async fn fetch_entry(&self, handle: &RepoHandle) -> Result<Option<String>> {
        let content = retry::retry(self.policy, "fetch_entry", GitHubError::classify, || async {
            self.host.get_file(handle, ENTRY_FILE).await
        })
        .await?;
        Ok(content)
    }

    /// Write the file set into a fresh working tree, commit and push.
    /// Returns the commit SHA (HEAD when the tree was already clean).
    pub async fn publish(
        &self,
        handle: &RepoHandle,
        result: &GenerationResult,
        round: u32,
    ) -> Result<String> {
        let dir = self
            .workspace_base
            .join(format!("{}-{}", handle.name, Uuid::new_v4()));

        let outcome = self.publish_in(&dir, handle, result, round).await;

        if dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                warn!("Failed to clean up working tree {:?}: {}", dir, e);
            }
        }

        outcome
    }

    async fn publish_in(
        &self,
        dir: &Path,
        handle: &RepoHandle,
        result: &GenerationResult,
        round: u32,
    ) -> Result<String> {
        if round >= 2 {
            retry::retry(self.policy, "clone", VcsError::classify, || async {
                self.tree.clone_repo(&handle.authenticated_url, dir).await
            })
            .await?;
        } else {
            self.tree.init(dir, &handle.default_branch).await?;
        }

        self.tree.write_files(dir, &result.files).await?;

        let sha = match self.tree.commit(dir, &result.commit_message).await? {
            Some(sha) => sha,
            None => {
                info!("Working tree is clean, keeping current HEAD");
                self.tree.head(dir).await?
            }
        };

        let force = round >= 2;
        retry::retry(self.policy, "push", VcsError::classify, || async {
            self.tree
                .push(dir, &handle.authenticated_url, &handle.default_branch, force)
                .await
        })
        .await?;

        info!(
            repo = %handle.full_name(),
            sha = %sha,
            force = force,
            "Pushed generated file set"
        );

        Ok(sha)
    }
}
