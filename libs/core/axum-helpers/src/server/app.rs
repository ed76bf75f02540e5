use super::shutdown::{ShutdownCoordinator, coordinated_shutdown};
use crate::errors::handlers::{method_not_allowed, not_found, panic_response};
use crate::http::create_cors_layer;
use axum::{Router, extract::DefaultBodyLimit};
use core_config::server::ServerConfig;
use core_config::Settings;
use std::io;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - Swagger UI at `/swagger-ui`, OpenAPI document at `/api-docs/openapi.json`
/// - The given routes, merged at the root
/// - 404 and 405 envelopes for unknown routes and unsupported methods
/// - Request body limit from `max_upload_size`
/// - Tracing, panic recovery and CORS from `allowed_hosts`
///
/// Routes must already have their state applied.
///
/// # Errors
/// Returns an error if an entry of `allowed_hosts` is not a valid origin.
pub fn create_router<T>(routes: Router, settings: &Settings) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors_layer = create_cors_layer(&settings.allowed_hosts).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid ALLOWED_HOSTS value: {}", e),
        )
    })?;

    info!(
        allowed_origins = ?settings.allowed_hosts,
        max_body_bytes = settings.max_upload_size,
        "HTTP middleware configured"
    );

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(settings.max_upload_size))
        // Inside the trace layer so panics are logged within the request span
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer);

    Ok(router)
}

/// Server with coordinated shutdown and cleanup.
///
/// On SIGINT/SIGTERM the server stops accepting connections, drains
/// in-flight requests and runs `cleanup` with `shutdown_timeout` as an
/// upper bound.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     let _ = worker_shutdown.send(true);
///     let _ = worker_handle.await;
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        let _ = shutdown_rx.recv().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(coordinated_shutdown(coordinator.clone()))
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // Make sure cleanup runs even if the server stopped on its own.
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
