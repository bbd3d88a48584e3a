use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pagewright_core::{Attachment, TaskRequest, TaskStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Raw submission body. The `secret` field is checked here and stripped
/// before the request reaches the pipeline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitTaskRequest {
    pub email: String,
    pub secret: String,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub brief: String,
    pub evaluation_url: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitTaskResponse {
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub status: TaskStatus,
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = SubmitTaskRequest,
    responses(
        (status = 202, description = "Task accepted, pipeline started", body = SubmitTaskResponse),
        (status = 400, description = "Invalid slug, round or brief"),
        (status = 401, description = "Secret mismatch")
    ),
    tag = "tasks"
)]
pub async fn submit_task(
    State(state): State<AppState>,
    Json(payload): Json<SubmitTaskRequest>,
) -> Result<(StatusCode, Json<SubmitTaskResponse>), AppError> {
    if !state.secret_matches(&payload.secret) {
        return Err(AppError::Unauthorized);
    }

    let request = TaskRequest {
        email: payload.email,
        task: payload.task,
        round: payload.round,
        nonce: payload.nonce,
        brief: payload.brief,
        evaluation_url: payload.evaluation_url,
        attachments: payload.attachments,
    };
    request.validate()?;

    let response = SubmitTaskResponse {
        task: request.task.clone(),
        round: request.round,
        nonce: request.nonce.clone(),
        status: TaskStatus::Received,
    };

    // The caller is acknowledged now; the pipeline reports its outcome
    // to the evaluation URL, never back through this response.
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.run(request).await;
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}
