//! Enqueue background tasks and poll their status.

use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use axum_helpers::{AppError, ErrorResponse, JsonBody, UuidPath};
use domain_research::DomainError;
use serde::Serialize;
use serde_json::Value;
use task_worker::{TaskError, TaskState, TaskStatus};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskListResponse {
    pub tasks: Vec<&'static str>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnqueuedTask {
    pub task_id: Uuid,
    pub task_name: String,
    pub state: TaskState,
}

/// `{task}` is a task name for POST and a task id for GET; axum needs one
/// parameter name per segment.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_tasks))
        .route("/{task}", get(get_task_status).post(enqueue_task))
        .with_state(state)
}

/// List registered task names
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "tasks",
    responses((status = 200, description = "Registered task names", body = TaskListResponse))
)]
pub async fn list_tasks(State(state): State<AppState>) -> Json<TaskListResponse> {
    Json(TaskListResponse {
        tasks: state.queue.registered(),
    })
}

/// Enqueue a task
///
/// The request body is passed to the task unchanged as its payload.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task}",
    tag = "tasks",
    params(("task" = String, Path, description = "Registered task name")),
    request_body(content = serde_json::Value, description = "Task payload", content_type = "application/json"),
    responses(
        (status = 202, description = "Task accepted", body = EnqueuedTask),
        (status = 400, description = "Unknown task or malformed body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn enqueue_task(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<(StatusCode, Json<EnqueuedTask>), AppError> {
    let task_id = state
        .queue
        .enqueue(&task_name, payload)
        .await
        .map_err(|e| enqueue_error(&state, &task_name, e))?;

    info!(%task_id, task_name = %task_name, "Task enqueued");

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueuedTask {
            task_id,
            task_name,
            state: TaskState::Pending,
        }),
    ))
}

/// Get the current status of a task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task}",
    tag = "tasks",
    params(("task" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task status", body = TaskStatus),
        (status = 400, description = "Invalid task ID", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn get_task_status(
    State(state): State<AppState>,
    UuidPath(task_id): UuidPath,
) -> Result<Json<TaskStatus>, AppError> {
    state
        .queue
        .status(&task_id)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", task_id)))
}

fn enqueue_error(state: &AppState, task_name: &str, err: TaskError) -> AppError {
    match err {
        TaskError::UnknownTask(_) => DomainError::processing(format!("Unknown task: {}", task_name))
            .with_detail("task_name", task_name)
            .with_detail("available", state.queue.registered())
            .into(),
        other => {
            error!(task_name = %task_name, error = %other, "Failed to enqueue task");
            AppError::InternalServerError(other.to_string())
        }
    }
}
