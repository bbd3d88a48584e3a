use async_trait::async_trait;
use pagewright_core::GeneratedFile;
use std::path::Path;

use crate::error::Result;

/// Operations the pipeline needs from a local version-control working
/// tree. One fresh directory per publish; no state is kept between calls.
#[async_trait]
pub trait WorkTree: Send + Sync {
    /// Check that the underlying tool exists.
    async fn is_available(&self) -> bool;

    /// Initialize an empty repository on the given branch (round 1).
    async fn init(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Clone an existing repository into `dir` (round >= 2).
    async fn clone_repo(&self, url: &str, dir: &Path) -> Result<()>;

    /// Write the generated file set into the tree, creating parent
    /// directories as needed. Only the given paths are touched.
    async fn write_files(&self, dir: &Path, files: &[GeneratedFile]) -> Result<()>;

    /// Read a file from the tree, `None` if it does not exist.
    async fn read_file(&self, dir: &Path, path: &str) -> Result<Option<String>>;

    /// Stage everything and commit. Returns `None` when the tree is
    /// clean and there is nothing to commit.
    async fn commit(&self, dir: &Path, message: &str) -> Result<Option<String>>;

    /// Current HEAD commit SHA.
    async fn head(&self, dir: &Path) -> Result<String>;

    /// Push HEAD to the given remote branch. `force` implements the
    /// last-writer-wins discipline used on update rounds.
    async fn push(&self, dir: &Path, remote_url: &str, branch: &str, force: bool) -> Result<()>;
}
