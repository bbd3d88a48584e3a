use std::time::Duration;

use async_trait::async_trait;
use pagewright_core::{Attachment, GenerationResult};
use reqwest::Client;
use retry::RetryPolicy;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::{GenerationError, Result};
use crate::prompts::GenerationPrompts;
use crate::schema;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ModelApiError, ResponseFormat};

/// Generation calls are rate-limited and occasionally malformed, so they
/// get a slightly larger budget than plain network calls.
const DEFAULT_MAX_ATTEMPTS: u32 = 4;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce the full file set for a new project (round 1).
    async fn generate_new(
        &self,
        brief: &str,
        attachments: &[Attachment],
    ) -> Result<GenerationResult>;

    /// Produce a targeted update of the deployed entry file (round >= 2).
    async fn generate_update(&self, existing_entry: &str, brief: &str)
        -> Result<GenerationResult>;
}

/// Client for an OpenAI-compatible chat completions API with enforced
/// structured output.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
            policy: RetryPolicy::new(
                DEFAULT_MAX_ATTEMPTS,
                Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            ),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn generate<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        prompt: String,
        schema_name: &str,
        output_schema: serde_json::Value,
    ) -> Result<T> {
        let schema_name = schema_name.to_string();

        retry::retry(self.policy, operation_name, GenerationError::classify, || async {
            let content = self
                .chat_completion_inner(&prompt, &schema_name, output_schema.clone())
                .await?;
            serde_json::from_str::<T>(&content)
                .map_err(|e| GenerationError::MalformedOutput(e.to_string()))
        })
        .await
    }

    async fn chat_completion_inner(
        &self,
        prompt: &str,
        schema_name: &str,
        output_schema: serde_json::Value,
    ) -> Result<String> {
        debug!(model = %self.model, schema = %schema_name, "Requesting generation");

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(GenerationPrompts::system()),
                ChatMessage::user(prompt),
            ],
            response_format: ResponseFormat::json_schema(schema_name, output_schema),
            temperature: None,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                warn!("Rate limited by model API");
                return Err(GenerationError::RateLimited { retry_after: None });
            }

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(GenerationError::Authentication(error_text));
            }

            if let Ok(error_resp) = serde_json::from_str::<ModelApiError>(&error_text) {
                error!(
                    "Model API error: {} (type: {:?})",
                    error_resp.error.message, error_resp.error.error_type
                );
                return Err(GenerationError::Api {
                    message: error_resp.error.message,
                    status_code: Some(status.as_u16()),
                });
            }

            return Err(GenerationError::Api {
                message: error_text,
                status_code: Some(status.as_u16()),
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::Api {
                message: "No completion returned".to_string(),
                status_code: None,
            })
    }
}

#[async_trait]
impl Generator for GenerationClient {
    async fn generate_new(
        &self,
        brief: &str,
        attachments: &[Attachment],
    ) -> Result<GenerationResult> {
        let prompt = GenerationPrompts::new_project(brief, attachments);
        let output: schema::NewProjectOutput = self
            .generate("generate_new", prompt, "new_project", schema::new_project_schema())
            .await?;

        if output.index_html.trim().is_empty() {
            return Err(GenerationError::MalformedOutput(
                "entry file is empty".to_string(),
            ));
        }

        Ok(output.into())
    }

    async fn generate_update(
        &self,
        existing_entry: &str,
        brief: &str,
    ) -> Result<GenerationResult> {
        let prompt = GenerationPrompts::update(existing_entry, brief);
        let output: schema::UpdateOutput = self
            .generate("generate_update", prompt, "update_entry", schema::update_schema())
            .await?;

        if output.index_html.trim().is_empty() {
            return Err(GenerationError::MalformedOutput(
                "entry file is empty".to_string(),
            ));
        }

        Ok(output.into())
    }
}
