use utoipa::OpenApi;

/// Research API documentation, served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(title = "Research Pipeline API", description = "Health, status and background tasks"),
    paths(
        crate::api::health::root,
        crate::api::health::liveness,
        crate::api::health::health,
        crate::api::health::detailed_health,
        crate::api::status::status,
        crate::api::tasks::list_tasks,
        crate::api::tasks::enqueue_task,
        crate::api::tasks::get_task_status,
    ),
    components(schemas(
        crate::api::health::WelcomeResponse,
        crate::api::health::LivenessResponse,
        crate::api::health::HealthResponse,
        crate::api::health::ComponentsHealth,
        crate::api::health::DetailedHealthResponse,
        crate::api::status::StatusResponse,
        crate::api::status::ServicesStatus,
        crate::api::tasks::TaskListResponse,
        crate::api::tasks::EnqueuedTask,
        task_worker::TaskStatus,
        task_worker::TaskState,
        task_worker::Progress,
        axum_helpers::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Liveness and health reports"),
        (name = "status", description = "API status"),
        (name = "tasks", description = "Background task queue")
    )
)]
pub struct ApiDoc;
