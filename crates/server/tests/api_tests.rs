use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use generation::GenerationClient;
use github::{GitHubClient, SourceHost};
use orchestrator::{
    NotificationDispatcher, PagesPublisher, RepositoryManager, TaskOrchestrator, TaskStore,
};
use retry::RetryPolicy;
use serde_json::{json, Value};
use server::state::AppState;
use tempfile::TempDir;
use vcs::{GitWorkTree, WorkTree};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-secret";

struct TestHarness {
    server: TestServer,
    model: MockServer,
    github: MockServer,
    callback: MockServer,
    _workspace: TempDir,
}

async fn setup() -> TestHarness {
    let model = MockServer::start().await;
    let github = MockServer::start().await;
    let callback = MockServer::start().await;
    let workspace = TempDir::new().expect("Failed to create workspace dir");

    let fast = RetryPolicy::new(2, Duration::from_millis(5));

    let generator = Arc::new(
        GenerationClient::new("test-key".to_string(), model.uri(), "test-model".to_string())
            .with_retry_policy(fast),
    );
    let host: Arc<dyn SourceHost> = Arc::new(
        GitHubClient::with_api_base("test-token", "octo", &github.uri())
            .expect("Failed to build GitHub client"),
    );
    let tree: Arc<dyn WorkTree> = Arc::new(GitWorkTree::default());

    let orchestrator = TaskOrchestrator::new(
        generator,
        RepositoryManager::new(host.clone(), tree, workspace.path().to_path_buf())
            .with_retry_policy(fast),
        PagesPublisher::new(host)
            .with_config_policy(fast)
            .with_poll_policy(fast),
        Arc::new(NotificationDispatcher::new().with_retry_policy(fast)),
        TaskStore::new(),
    );

    let state = AppState::new(Arc::new(orchestrator), SECRET);
    let server = TestServer::new(server::create_router(state)).expect("Failed to start server");

    TestHarness {
        server,
        model,
        github,
        callback,
        _workspace: workspace,
    }
}

fn submission(harness: &TestHarness, task: &str, round: u32, secret: &str) -> Value {
    json!({
        "email": "dev@example.com",
        "secret": secret,
        "task": task,
        "round": round,
        "nonce": "n-123",
        "brief": "gradient hello world page",
        "evaluation_url": format!("{}/evaluate", harness.callback.uri()),
        "attachments": []
    })
}

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..200 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= count {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Timed out waiting for {} requests", count);
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let harness = setup().await;

        let response = harness.server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

mod submission {
    use super::*;

    #[tokio::test]
    async fn test_secret_mismatch_is_unauthorized() {
        let harness = setup().await;

        let response = harness
            .server
            .post("/api/tasks")
            .json(&submission(&harness, "hello", 1, "wrong-secret"))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"], "unauthorized");

        // Nothing was spawned.
        assert!(harness.model.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsafe_slug_is_rejected() {
        let harness = setup().await;

        let response = harness
            .server
            .post("/api/tasks")
            .json(&submission(&harness, "Not A Slug!", 1, SECRET))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_round_zero_is_rejected() {
        let harness = setup().await;

        let response = harness
            .server
            .post("/api/tasks")
            .json(&submission(&harness, "hello", 0, SECRET))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_valid_submission_is_acknowledged_immediately() {
        let harness = setup().await;

        // The pipeline dies at generation; acceptance must not care.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&harness.model)
            .await;

        let response = harness
            .server
            .post("/api/tasks")
            .json(&submission(&harness, "hello-world-test", 1, SECRET))
            .await;

        response.assert_status(axum::http::StatusCode::ACCEPTED);
        let body: Value = response.json();
        assert_eq!(body["task"], "hello-world-test");
        assert_eq!(body["round"], 1);
        assert_eq!(body["nonce"], "n-123");
        assert_eq!(body["status"], "received");
    }

    #[tokio::test]
    async fn test_failed_pipeline_still_notifies_callback() {
        let harness = setup().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&harness.model)
            .await;
        Mock::given(method("POST"))
            .and(path("/evaluate"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&harness.callback)
            .await;

        harness
            .server
            .post("/api/tasks")
            .json(&submission(&harness, "doomed-task", 1, SECRET))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);

        let delivered = wait_for_requests(&harness.callback, 1).await;
        let payload: Value = delivered[0].body_json().unwrap();
        assert_eq!(payload["task"], "doomed-task");
        assert_eq!(payload["round"], 1);
        assert_eq!(payload["nonce"], "n-123");
        assert!(payload["error"].is_string());
        assert!(payload.get("repo_url").is_none() || payload["repo_url"].is_null());

        // The repository API was never reached.
        assert!(harness.github.received_requests().await.unwrap().is_empty());
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn test_status_starts_empty() {
        let harness = setup().await;

        let response = harness.server.get("/api/status").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["running"], 0);
        assert!(body["last_task"].is_null());
    }

    #[tokio::test]
    async fn test_status_reflects_last_submission() {
        let harness = setup().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&harness.model)
            .await;
        Mock::given(method("POST"))
            .and(path("/evaluate"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&harness.callback)
            .await;

        harness
            .server
            .post("/api/tasks")
            .json(&submission(&harness, "tracked-task", 3, SECRET))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);

        // Once the callback fires the pipeline has reached its terminal
        // state and the record is stable.
        wait_for_requests(&harness.callback, 1).await;

        let body: Value = harness.server.get("/api/status").await.json();
        let record = &body["last_task"];
        assert_eq!(record["task"], "tracked-task");
        assert_eq!(record["round"], 3);
        assert_eq!(record["status"], "failed");
    }
}
