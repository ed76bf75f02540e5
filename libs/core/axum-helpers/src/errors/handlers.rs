use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;

use super::{AppError, ErrorResponse, log_internal};

/// Handler for 404 Not Found errors.
///
/// This can be used as a fallback handler in your router.
pub async fn not_found() -> Response {
    AppError::not_found("The requested resource was not found").into_response()
}

/// Handler for 405 Method Not Allowed errors.
///
/// Use with `Router::method_not_allowed_fallback`.
pub async fn method_not_allowed() -> Response {
    AppError::MethodNotAllowed.into_response()
}

/// Response for a panic caught by `CatchPanicLayer`.
///
/// The payload is logged; the client gets the generic 500 envelope.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    log_internal(&format!("Handler panicked: {}", detail));

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal())).into_response()
}
