pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pagewright API",
        version = "0.1.0",
        description = "Turns a briefed task into a deployed static site and reports back"
    ),
    paths(
        routes::health_check,
        routes::submit_task,
        routes::get_status,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::SubmitTaskRequest,
        routes::SubmitTaskResponse,
        routes::StatusResponse,
        pagewright_core::Attachment,
        pagewright_core::TaskRecord,
        pagewright_core::TaskStatus,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tasks", description = "Task submission"),
        (name = "status", description = "Pipeline status inspection"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/tasks", post(routes::submit_task))
        .route("/api/status", get(routes::get_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
