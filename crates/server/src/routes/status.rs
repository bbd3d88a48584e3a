use axum::extract::State;
use axum::Json;
use pagewright_core::TaskRecord;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Pipelines currently in flight.
    pub running: usize,
    /// The last task this process accepted, if any.
    pub last_task: Option<TaskRecord>,
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Diagnostic snapshot of the pipeline", body = StatusResponse)
    ),
    tag = "status"
)]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.snapshot();
    Json(StatusResponse {
        running: snapshot.running,
        last_task: snapshot.last_task,
    })
}
