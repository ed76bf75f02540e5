//! Research Pipeline API
//!
//! HTTP front end for the research pipeline. Serves health and status
//! reports and runs the background tasks on an in-process worker.

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

use axum::{Router, middleware, routing::get};
use axum_helpers::{create_production_app, create_router};
use config::Config;
use core_config::tracing::init_tracing;
use domain_research::{ResearchPipeline, tasks::default_registry};
use eyre::WrapErr;
use observability::{init_metrics, metrics_handler, metrics_middleware};
use state::AppState;
use std::io;
use std::time::Duration;
use task_worker::TaskWorker;
use tokio::sync::watch;
use tracing::{info, warn};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Full application router: API routes, `/metrics`, docs and middleware.
///
/// # Errors
/// Returns an error if `allowed_hosts` contains an invalid origin.
pub fn build_app(state: &AppState) -> io::Result<Router> {
    let routes = api::routes(state).route("/metrics", get(metrics_handler));

    // Layered after the fallbacks exist so 404s and 405s are counted too
    Ok(create_router::<openapi::ApiDoc>(routes, &state.settings)?
        .layer(middleware::from_fn(metrics_middleware)))
}

/// Starts the service and blocks until it has shut down.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The research pipeline cannot be found at `RESEARCH_PIPELINE_PATH`
/// - The upload folder cannot be created
/// - The server fails to bind or stops with an error
pub async fn run() -> eyre::Result<()> {
    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    let settings = config.settings.clone();
    let environment = settings.environment();

    init_tracing(&environment);
    init_metrics();

    info!(
        name = %settings.app_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = environment.as_str(),
        "Starting research API"
    );

    if settings.has_default_secret() && !environment.is_development() {
        warn!("SECRET_KEY is the built-in default; set a real secret in production");
    }

    let pipeline = ResearchPipeline::load(&settings.research_pipeline_path)
        .wrap_err("Research pipeline is not available")?;
    info!(root = %pipeline.root().display(), components = ?ResearchPipeline::exports(), "Research pipeline ready");

    tokio::fs::create_dir_all(&settings.upload_folder)
        .await
        .wrap_err_with(|| {
            format!(
                "Failed to create upload folder {}",
                settings.upload_folder.display()
            )
        })?;

    let worker = TaskWorker::new(default_registry(&config.tasks), config.worker.clone());
    info!(
        worker_id = %config.worker.worker_id,
        max_concurrent_jobs = config.worker.max_concurrent_jobs,
        tasks = ?worker.queue().registered(),
        "Task worker configured"
    );

    let state = AppState::new(settings.clone(), worker.queue());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    let app = build_app(&state)?;

    info!("Starting research API with graceful shutdown ({:?} timeout)", SHUTDOWN_TIMEOUT);

    create_production_app(app, &settings.server(), SHUTDOWN_TIMEOUT, async move {
        info!("Shutting down: stopping task worker");
        let _ = shutdown_tx.send(true);
        if let Err(e) = worker_handle.await {
            tracing::error!(error = %e, "Task worker did not stop cleanly");
        }
    })
    .await
    .wrap_err("Server error")?;

    info!("Research API shutdown complete");
    Ok(())
}
