use async_trait::async_trait;
use pagewright_core::GeneratedFile;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VcsError};
use crate::traits::WorkTree;

/// Git-CLI implementation of [`WorkTree`].
///
/// Commits carry an explicit author so no global git config is required
/// in the environment the server runs in.
pub struct GitWorkTree {
    author_name: String,
    author_email: String,
}

impl GitWorkTree {
    pub fn new(author_name: impl Into<String>, author_email: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            author_email: author_email.into(),
        }
    }

    async fn run_git(&self, args: &[&str], cwd: &Path) -> Result<String> {
        debug!("Running git {:?} in {:?}", args, cwd);

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Authentication failed")
                || stderr.contains("could not read Username")
                || stderr.contains("Permission denied")
                || stderr.contains("403")
            {
                return Err(VcsError::AuthenticationFailed(stderr.into_owned()));
            }
            return Err(VcsError::CommandFailed(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn config_args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            format!("user.name={}", self.author_name),
            "-c".to_string(),
            format!("user.email={}", self.author_email),
            "-c".to_string(),
            "commit.gpgsign=false".to_string(),
        ]
    }

    fn parent_of(dir: &Path) -> Result<PathBuf> {
        dir.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| VcsError::InvalidPath(dir.display().to_string()))
    }
}

impl Default for GitWorkTree {
    fn default() -> Self {
        Self::new("pagewright", "pagewright@localhost")
    }
}

#[async_trait]
impl WorkTree for GitWorkTree {
    async fn is_available(&self) -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn init(&self, dir: &Path, branch: &str) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;
        self.run_git(&["init", "-b", branch], dir).await?;
        Ok(())
    }

    async fn clone_repo(&self, url: &str, dir: &Path) -> Result<()> {
        let parent = Self::parent_of(dir)?;
        tokio::fs::create_dir_all(&parent).await?;

        let dir_str = dir
            .to_str()
            .ok_or_else(|| VcsError::InvalidPath(dir.display().to_string()))?;
        self.run_git(&["clone", url, dir_str], &parent).await?;
        Ok(())
    }

    async fn write_files(&self, dir: &Path, files: &[GeneratedFile]) -> Result<()> {
        for file in files {
            let target = dir.join(&file.path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, &file.content).await?;
        }
        Ok(())
    }

    async fn read_file(&self, dir: &Path, path: &str) -> Result<Option<String>> {
        let target = dir.join(path);
        if !target.exists() {
            return Ok(None);
        }
        Ok(Some(tokio::fs::read_to_string(&target).await?))
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<Option<String>> {
        let status = self.run_git(&["status", "--porcelain"], dir).await?;
        if status.is_empty() {
            return Ok(None);
        }

        self.run_git(&["add", "-A"], dir).await?;

        let config = self.config_args();
        let mut args: Vec<&str> = config.iter().map(String::as_str).collect();
        args.extend(["commit", "-m", message]);
        self.run_git(&args, dir).await?;

        Ok(Some(self.head(dir).await?))
    }

    async fn head(&self, dir: &Path) -> Result<String> {
        let output = self.run_git(&["rev-parse", "HEAD"], dir).await?;
        Ok(output.trim().to_string())
    }

    async fn push(&self, dir: &Path, remote_url: &str, branch: &str, force: bool) -> Result<()> {
        let refspec = format!("HEAD:refs/heads/{}", branch);
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.push(remote_url);
        args.push(&refspec);

        self.run_git(&args, dir).await?;
        Ok(())
    }
}
