use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

/// Which part of the research workflow raised the error.
///
/// The kind only tags the error for logs and the `type` field; every kind
/// is handled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, IntoStaticStr, EnumIter)]
pub enum DomainErrorKind {
    #[strum(serialize = "UploadError")]
    Upload,
    #[strum(serialize = "ProcessingError")]
    Processing,
    #[strum(serialize = "ImputationError")]
    Imputation,
    #[strum(serialize = "CorrelationError")]
    Correlation,
}

impl DomainErrorKind {
    /// Value of the `type` field, e.g. `ImputationError`.
    pub fn type_name(&self) -> &'static str {
        self.into()
    }

    /// Value of the `error` field, e.g. `Imputation Error`.
    pub fn label(&self) -> &'static str {
        match self {
            DomainErrorKind::Upload => "Upload Error",
            DomainErrorKind::Processing => "Processing Error",
            DomainErrorKind::Imputation => "Imputation Error",
            DomainErrorKind::Correlation => "Correlation Error",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct DomainError {
    pub kind: DomainErrorKind,
    pub message: String,
    pub details: Map<String, Value>,
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn new(kind: DomainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Upload, message)
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Processing, message)
    }

    pub fn imputation(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Imputation, message)
    }

    pub fn correlation(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Correlation, message)
    }

    /// Attach a contextual key/value pair, reported under `details`.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Convert DomainError to AppError for standardized error responses
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Domain {
            type_name: err.kind.type_name(),
            label: err.kind.label(),
            message: err.message,
            details: err.details,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
