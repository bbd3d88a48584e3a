use std::time::Duration;

use async_trait::async_trait;
use pagewright_core::CallbackPayload;
use retry::{Classification, RetryPolicy};
use thiserror::Error;
use tracing::{error, info};

const NOTIFY_MAX_ATTEMPTS: u32 = 2;
const NOTIFY_BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Error)]
enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Callback endpoint returned {code}")]
    Status { code: u16 },
}

impl NotifyError {
    fn classify(&self) -> Classification {
        match self {
            Self::Http(_) => Classification::Retryable,
            Self::Status { code } => match code {
                429 => Classification::Retryable,
                code if *code >= 500 => Classification::Retryable,
                _ => Classification::Fatal,
            },
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the terminal outcome for a task. Never fails: once the
    /// pipeline is done there is no caller left to inform, so exhausted
    /// retries are logged and swallowed.
    async fn notify(&self, evaluation_url: &str, payload: &CallbackPayload);
}

pub struct NotificationDispatcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            policy: RetryPolicy::new(
                NOTIFY_MAX_ATTEMPTS,
                Duration::from_millis(NOTIFY_BASE_DELAY_MS),
            ),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn notify(&self, evaluation_url: &str, payload: &CallbackPayload) {
        let outcome = retry::retry(self.policy, "notify", NotifyError::classify, || async {
            let response = self
                .client
                .post(evaluation_url)
                .json(payload)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(NotifyError::Status {
                    code: status.as_u16(),
                });
            }
            Ok(())
        })
        .await;

        match outcome {
            Ok(()) => info!(
                task = %payload.task,
                round = payload.round,
                success = payload.is_success(),
                "Callback delivered"
            ),
            Err(e) => error!(
                task = %payload.task,
                url = %evaluation_url,
                "Callback delivery failed, giving up: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_core::{DeploymentResult, TaskRequest};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher() -> NotificationDispatcher {
        NotificationDispatcher::new()
            .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(5)))
    }

    fn payload() -> CallbackPayload {
        let request = TaskRequest {
            email: "dev@example.com".to_string(),
            task: "hello".to_string(),
            round: 1,
            nonce: "n1".to_string(),
            brief: "a page".to_string(),
            evaluation_url: String::new(),
            attachments: vec![],
        };
        let deployment = DeploymentResult {
            repo_url: "https://github.com/o/hello".to_string(),
            commit_sha: "abc".to_string(),
            pages_url: "https://o.github.io/hello/".to_string(),
        };
        CallbackPayload::success(&request, &deployment)
    }

    #[tokio::test]
    async fn test_retries_transient_failure_then_delivers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        dispatcher()
            .notify(&format!("{}/cb", server.uri()), &payload())
            .await;

        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        // Must not panic or error out.
        dispatcher()
            .notify(&format!("{}/cb", server.uri()), &payload())
            .await;

        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cb"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        dispatcher()
            .notify(&format!("{}/cb", server.uri()), &payload())
            .await;

        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
