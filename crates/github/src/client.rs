use async_trait::async_trait;
use base64::Engine;
use octocrab::Octocrab;
use reqwest::{Response, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{GitHubError, Result};
use crate::traits::SourceHost;
use crate::types::{ContentsResponse, CreateRepoRequest, PagesConfig, RepoHandle};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// GitHub implementation of [`SourceHost`].
///
/// Repository calls go through octocrab; the Pages and contents
/// endpoints are plain REST calls since octocrab has no typed surface
/// for them.
pub struct GitHubClient {
    octocrab: Octocrab,
    http: reqwest::Client,
    owner: String,
    token: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: &str, owner: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, owner, DEFAULT_API_BASE)
    }

    pub fn with_api_base(token: &str, owner: impl Into<String>, api_base: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base)
            .map_err(|e| GitHubError::Config(e.to_string()))?
            .build()
            .map_err(|e| GitHubError::Config(e.to_string()))?;

        Ok(Self {
            octocrab,
            http: reqwest::Client::new(),
            owner: owner.into(),
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| GitHubError::Authentication("GITHUB_TOKEN not set".to_string()))?;
        let owner = std::env::var("GITHUB_OWNER")
            .map_err(|_| GitHubError::Config("GITHUB_OWNER not set".to_string()))?;
        Self::new(&token, owner)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn handle_from(&self, repo: octocrab::models::Repository) -> RepoHandle {
        let name = repo.name.clone();
        let default_branch = repo.default_branch.unwrap_or_else(|| "main".to_string());
        let html_url = repo
            .html_url
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{}/{}", self.owner, name));
        let authenticated_url = format!(
            "https://x-access-token:{}@github.com/{}/{}.git",
            self.token, self.owner, name
        );

        RepoHandle {
            owner: self.owner.clone(),
            name,
            default_branch,
            html_url,
            authenticated_url,
        }
    }

    fn rest(&self, method: reqwest::Method, route: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, route)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "pagewright")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn repo_route(&self, handle: &RepoHandle, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base, handle.owner, handle.name, suffix
        )
    }

    async fn rest_error(response: Response) -> GitHubError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHubError::Authentication(body),
            StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited,
            _ => GitHubError::Api {
                message: body,
                status_code: Some(status.as_u16()),
            },
        }
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn create_repository(&self, slug: &str) -> Result<RepoHandle> {
        info!("Creating repository {}/{}", self.owner, slug);

        let body = CreateRepoRequest::new(slug);
        let created: std::result::Result<octocrab::models::Repository, octocrab::Error> =
            self.octocrab.post("/user/repos", Some(&body)).await;

        match created {
            Ok(repo) => Ok(self.handle_from(repo)),
            Err(e) => match GitHubError::from(e) {
                // Slugs are validated before submission, so a 409/422 on
                // create means the name is taken.
                GitHubError::Api {
                    status_code: Some(409 | 422),
                    ..
                } => Err(GitHubError::RepoAlreadyExists {
                    owner: self.owner.clone(),
                    repo: slug.to_string(),
                }),
                other => Err(other),
            },
        }
    }

    async fn get_repository(&self, slug: &str) -> Result<RepoHandle> {
        debug!("Resolving repository {}/{}", self.owner, slug);

        let found = self.octocrab.repos(&self.owner, slug).get().await;

        match found {
            Ok(repo) => Ok(self.handle_from(repo)),
            Err(e) => match GitHubError::from(e) {
                GitHubError::Api {
                    status_code: Some(404),
                    ..
                } => Err(GitHubError::RepoNotFound {
                    owner: self.owner.clone(),
                    repo: slug.to_string(),
                }),
                other => Err(other),
            },
        }
    }

    async fn get_file(&self, handle: &RepoHandle, path: &str) -> Result<Option<String>> {
        let route = self.repo_route(handle, &format!("/contents/{}", path));
        let response = self.rest(reqwest::Method::GET, route).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        let contents: ContentsResponse = response.json().await?;
        if contents.encoding != "base64" {
            return Ok(Some(contents.content));
        }

        let compact: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| GitHubError::Api {
                message: format!("contents API returned invalid base64: {}", e),
                status_code: None,
            })?;
        let text = String::from_utf8(bytes).map_err(|e| GitHubError::Api {
            message: format!("file content is not UTF-8: {}", e),
            status_code: None,
        })?;

        Ok(Some(text))
    }

    async fn get_pages(&self, handle: &RepoHandle) -> Result<Option<PagesConfig>> {
        let route = self.repo_route(handle, "/pages");
        let response = self.rest(reqwest::Method::GET, route).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        Ok(Some(response.json().await?))
    }

    async fn create_pages(&self, handle: &RepoHandle) -> Result<()> {
        info!("Enabling Pages for {}", handle.full_name());

        let route = self.repo_route(handle, "/pages");
        let body = json!({ "source": { "branch": handle.default_branch, "path": "/" } });
        let response = self
            .rest(reqwest::Method::POST, route)
            .json(&body)
            .send()
            .await?;

        // Someone else enabled it first; the poll will pick it up.
        if response.status() == StatusCode::CONFLICT {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        Ok(())
    }

    async fn update_pages(&self, handle: &RepoHandle) -> Result<()> {
        info!("Reconfiguring Pages for {}", handle.full_name());

        let route = self.repo_route(handle, "/pages");
        let body = json!({ "source": { "branch": handle.default_branch, "path": "/" } });
        let response = self
            .rest(reqwest::Method::PUT, route)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        Ok(())
    }
}
