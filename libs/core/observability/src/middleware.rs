//! Axum middleware for per-request HTTP metrics.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, Response, StatusCode},
    middleware::Next,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Records `http_requests_total`, `http_request_duration_seconds` and,
/// for 4xx/5xx responses, `http_requests_errors_total`.
///
/// The `path` label is the matched route template so that path parameters
/// (task ids) do not explode label cardinality. Unmatched requests are
/// grouped under `"unmatched"`.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn(metrics_middleware));
/// ```
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    let status = response.status();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status_class" => status_class(status)
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(start.elapsed().as_secs_f64());

    if status.is_client_error() || status.is_server_error() {
        counter!(
            "http_requests_errors_total",
            "method" => method,
            "path" => path,
            "status" => status.as_u16().to_string()
        )
        .increment(1);
    }

    response
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
