use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use core_config::Settings;
use domain_research::tasks::{TaskSettings, default_registry};
use http_body_util::BodyExt;
use research_api::{build_app, state::AppState};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use task_worker::{TaskQueue, TaskWorker, WorkerConfig};
use tokio::sync::watch;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    queue: TaskQueue,
    _shutdown: watch::Sender<bool>,
}

fn test_app() -> TestApp {
    test_app_with(WorkerConfig::default())
}

fn test_app_with(worker_config: WorkerConfig) -> TestApp {
    let tasks = TaskSettings {
        process_step_delay: Duration::from_millis(1),
        email_delay: Duration::from_millis(1),
        collect_system_metrics: false,
        ..TaskSettings::default()
    };
    let worker = TaskWorker::new(default_registry(&tasks), worker_config);
    let queue = worker.queue();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(worker.run(shutdown_rx));

    let state = AppState::new(Arc::new(Settings::default()), queue.clone());
    let router = build_app(&state).unwrap();
    TestApp {
        router,
        queue,
        _shutdown: shutdown_tx,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn get(app: &TestApp, uri: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: &TestApp, uri: &str, body: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_root_welcome_message() {
    let app = test_app();

    let response = get(&app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"message": "Welcome to Research Pipeline API"})
    );
}

#[tokio::test]
async fn test_liveness() {
    let app = test_app();

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "healthy", "service": "Research Pipeline API"})
    );
}

#[tokio::test]
async fn test_health_report() {
    let app = test_app();

    let response = get(&app, "/api/health/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Research Pipeline API");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["environment"], "production");
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_detailed_health_report() {
    let app = test_app();

    let response = get(&app, "/api/health/detailed").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["components"],
        json!({"api": "healthy", "database": "healthy", "redis": "healthy", "file_system": "healthy"})
    );
    assert!(body["uptime"].is_u64());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_api_status() {
    let app = test_app();

    let response = get(&app, "/api/v1/status").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "status": "operational",
            "version": "1.0.0",
            "services": {
                "imputation": "available",
                "correlation": "available",
                "eda": "available",
                "feature_selection": "available"
            }
        })
    );
}

#[tokio::test]
async fn test_unknown_route_returns_not_found_envelope() {
    let app = test_app();

    let response = get(&app, "/api/v1/nothing-here").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["type"], "NotFound");
}

#[tokio::test]
async fn test_wrong_method_returns_method_not_allowed_envelope() {
    let app = test_app();

    let response = post_json(&app, "/api/health/", "{}").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Method Not Allowed");
    assert_eq!(body["type"], "MethodNotAllowed");
    assert_eq!(body["details"], json!({}));
}

#[tokio::test]
async fn test_list_tasks() {
    let app = test_app();

    let response = get(&app, "/api/v1/tasks").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"tasks": ["cleanup_old_files", "health_check", "process_data", "send_email"]})
    );
}

#[tokio::test]
async fn test_enqueue_unknown_task_is_processing_error() {
    let app = test_app();

    let response = post_json(&app, "/api/v1/tasks/reticulate_splines", "{}").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Processing Error");
    assert_eq!(body["type"], "ProcessingError");
    assert_eq!(body["message"], "Unknown task: reticulate_splines");
    assert_eq!(body["details"]["task_name"], "reticulate_splines");
    assert_eq!(body["details"]["available"].as_array().unwrap().len(), 4);
    assert!(app.queue.store().is_empty());
}

#[tokio::test]
async fn test_enqueue_malformed_json_is_bad_request() {
    let app = test_app();

    let response = post_json(&app, "/api/v1/tasks/process_data", "{\"total\": ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["type"], "BadRequest");
    assert_eq!(body["details"], json!({}));
}

#[tokio::test]
async fn test_enqueue_then_poll_until_success() {
    let app = test_app();

    let response = post_json(&app, "/api/v1/tasks/cleanup_old_files", "{}").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let accepted = json_body(response).await;
    assert_eq!(accepted["task_name"], "cleanup_old_files");
    assert_eq!(accepted["state"], "PENDING");

    let task_id: Uuid = accepted["task_id"].as_str().unwrap().parse().unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        app.queue.store().wait_for_completion(&task_id),
    )
    .await
    .unwrap()
    .unwrap();

    let response = get(&app, &format!("/api/v1/tasks/{}", task_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let status = json_body(response).await;
    assert_eq!(status["state"], "SUCCESS");
    assert_eq!(status["retries"], 0);
    assert_eq!(
        status["result"],
        json!({"status": "completed", "cleaned_files": 0, "directory": "/tmp"})
    );
    assert!(status.get("progress").is_none());
}

#[tokio::test]
async fn test_process_data_reports_result_through_status() {
    let app = test_app();

    let response = post_json(&app, "/api/v1/tasks/process_data", r#"{"total": 3}"#).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let task_id: Uuid = json_body(response).await["task_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let status = tokio::time::timeout(
        Duration::from_secs(5),
        app.queue.store().wait_for_completion(&task_id),
    )
    .await
    .unwrap()
    .unwrap();

    let result = status.result.unwrap();
    assert_eq!(result["status"], "completed");
    assert_eq!(result["processed_items"], 3);
    assert_eq!(result["task_id"], task_id.to_string());
}

#[tokio::test]
async fn test_unknown_task_id_is_not_found() {
    let app = test_app();

    let response = get(&app, &format!("/api/v1/tasks/{}", Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["type"], "NotFound");
}

#[tokio::test(start_paused = true)]
async fn test_expired_task_result_is_not_found() {
    let ttl = Duration::from_secs(3600);
    let app = test_app_with(WorkerConfig::new().with_result_ttl(ttl));

    let response = post_json(
        &app,
        "/api/v1/tasks/send_email",
        r#"{"recipient": "ops@example.com", "subject": "report"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let task_id: Uuid = json_body(response).await["task_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    app.queue.store().wait_for_completion(&task_id).await.unwrap();

    let uri = format!("/api/v1/tasks/{}", task_id);
    assert_eq!(get(&app, &uri).await.status(), StatusCode::OK);

    tokio::time::sleep(ttl + Duration::from_secs(120)).await;

    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["type"], "NotFound");
}

#[tokio::test]
async fn test_invalid_task_id_is_bad_request() {
    let app = test_app();

    let response = get(&app, "/api/v1/tasks/not-a-uuid").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["type"], "BadRequest");
    assert_eq!(body["message"], "Invalid UUID: not-a-uuid");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app();

    let response = get(&app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_count_unmatched_routes() {
    if observability::init_metrics().is_none() {
        return;
    }
    let app = test_app();

    let response = get(&app, "/definitely/not/a/route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/metrics").await;
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let rendered = String::from_utf8(body.to_vec()).unwrap();
    assert!(rendered.contains(r#"path="unmatched""#), "{rendered}");
}

#[tokio::test]
async fn test_openapi_lists_task_routes() {
    let app = test_app();

    let response = get(&app, "/api-docs/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/health/detailed"));
    assert!(paths["/api/v1/tasks/{task}"].get("get").is_some());
    assert!(paths["/api/v1/tasks/{task}"].get("post").is_some());
}
