use std::sync::Arc;

use anyhow::Context;
use generation::GenerationClient;
use github::{GitHubClient, SourceHost};
use orchestrator::{
    NotificationDispatcher, PagesPublisher, RepositoryManager, TaskOrchestrator, TaskStore,
};
use server::config::Settings;
use server::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vcs::{GitWorkTree, WorkTree};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env().context("loading configuration")?;
    tokio::fs::create_dir_all(&settings.workspace_dir)
        .await
        .context("creating workspace directory")?;

    let tree: Arc<dyn WorkTree> = Arc::new(GitWorkTree::default());
    if !tree.is_available().await {
        anyhow::bail!("git is not installed or not on PATH");
    }

    let host: Arc<dyn SourceHost> = Arc::new(GitHubClient::new(
        &settings.github_token,
        settings.github_owner.clone(),
    )?);
    let generator = Arc::new(GenerationClient::new(
        settings.model_api_key.clone(),
        settings.model_base_url.clone(),
        settings.model_id.clone(),
    ));

    let orchestrator = TaskOrchestrator::new(
        generator,
        RepositoryManager::new(host.clone(), tree, settings.workspace_dir.clone()),
        PagesPublisher::new(host),
        Arc::new(NotificationDispatcher::new()),
        TaskStore::new(),
    );

    let state = AppState::new(Arc::new(orchestrator), settings.submission_secret.clone());
    let app = server::create_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
