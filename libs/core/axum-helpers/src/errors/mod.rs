pub mod handlers;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::backtrace::Backtrace;
use thiserror::Error;
use tracing_error::SpanTrace;
use utoipa::ToSchema;

pub const INTERNAL_ERROR_LABEL: &str = "Internal Server Error";
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";
pub const INTERNAL_ERROR_TYPE: &str = "InternalServerError";

/// Standard error response structure.
///
/// Every failed request is answered with this shape:
/// - `error`: Short human-readable label (e.g., "Processing Error")
/// - `message`: What went wrong
/// - `details`: Contextual key/value pairs; omitted for 500 responses
/// - `type`: Machine-readable error kind (e.g., "ProcessingError")
///
/// # JSON Example
///
/// ```json
/// {
///   "error": "Upload Error",
///   "message": "File too large",
///   "details": {"max_bytes": 104857600},
///   "type": "UploadError"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorResponse {
    /// The fixed body for unexpected failures. Never carries the real cause.
    pub fn internal() -> Self {
        Self {
            error: INTERNAL_ERROR_LABEL.to_string(),
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            details: None,
            error_type: INTERNAL_ERROR_TYPE.to_string(),
        }
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    /// A domain-tagged error; always a client error.
    #[error("{label}: {message}")]
    Domain {
        type_name: &'static str,
        label: &'static str,
        message: String,
        details: Map<String, Value>,
    },

    #[error("Not Found: {message}")]
    NotFound {
        message: String,
        details: Map<String, Value>,
    },

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Path extraction error: {0}")]
    PathExtractorRejection(#[from] PathRejection),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::JsonExtractorRejection(_) => StatusCode::BAD_REQUEST,
            AppError::PathExtractorRejection(_) => StatusCode::BAD_REQUEST,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn bad_request(message: String) -> ErrorResponse {
    ErrorResponse {
        error: "Bad Request".to_string(),
        message,
        details: Some(Value::Object(Map::new())),
        error_type: "BadRequest".to_string(),
    }
}

/// Logs an unexpected failure with the active span trace and, when
/// `RUST_BACKTRACE` is set, a backtrace.
pub(crate) fn log_internal(message: &str) {
    tracing::error!(
        spantrace = %SpanTrace::capture(),
        backtrace = %Backtrace::capture(),
        "{}",
        message
    );
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Domain {
                type_name,
                label,
                message,
                details,
            } => {
                tracing::error!(
                    error_type = type_name,
                    details = %serde_json::Value::Object(details.clone()),
                    "{}",
                    message
                );
                ErrorResponse {
                    error: label.to_string(),
                    message,
                    details: Some(Value::Object(details)),
                    error_type: type_name.to_string(),
                }
            }
            AppError::NotFound { message, details } => {
                tracing::info!("Not found: {}", message);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message,
                    details: Some(Value::Object(details)),
                    error_type: "NotFound".to_string(),
                }
            }
            AppError::MethodNotAllowed => {
                tracing::info!("Method not allowed");
                ErrorResponse {
                    error: "Method Not Allowed".to_string(),
                    message: "The HTTP method is not allowed for this resource".to_string(),
                    details: Some(Value::Object(Map::new())),
                    error_type: "MethodNotAllowed".to_string(),
                }
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                bad_request(msg)
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!("JSON extraction error: {:?}", e);
                bad_request(e.body_text())
            }
            AppError::PathExtractorRejection(e) => {
                tracing::warn!("Path extraction error: {:?}", e);
                bad_request(e.body_text())
            }
            AppError::Io(e) => {
                log_internal(&format!("I/O error: {:?}", e));
                ErrorResponse::internal()
            }
            AppError::InternalServerError(msg) => {
                log_internal(&format!("Internal server error: {}", msg));
                ErrorResponse::internal()
            }
        };

        (status, Json(body)).into_response()
    }
}
