use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PagesConfig, RepoHandle};

/// What the pipeline needs from the source-hosting platform. One
/// implementation talks to GitHub; tests substitute in-memory fakes.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Create a repository named after the slug. Fails with
    /// `RepoAlreadyExists` on a conflict; callers decide whether that is
    /// fatal.
    async fn create_repository(&self, slug: &str) -> Result<RepoHandle>;

    /// Resolve an existing repository, `RepoNotFound` if absent.
    async fn get_repository(&self, slug: &str) -> Result<RepoHandle>;

    /// Fetch one file's content from the default branch, `None` if the
    /// path does not exist.
    async fn get_file(&self, handle: &RepoHandle, path: &str) -> Result<Option<String>>;

    /// Current Pages configuration, `None` when hosting was never
    /// enabled.
    async fn get_pages(&self, handle: &RepoHandle) -> Result<Option<PagesConfig>>;

    /// Enable Pages for the default branch at the site root.
    async fn create_pages(&self, handle: &RepoHandle) -> Result<()>;

    /// Point an existing Pages configuration back at the default branch
    /// and site root.
    async fn update_pages(&self, handle: &RepoHandle) -> Result<()>;
}
