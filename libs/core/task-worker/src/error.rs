//! Task error types and error categorization
//!
//! Errors are categorized to determine retry behavior:
//! - **Transient**: the task's retry policy decides whether to try again
//! - **Permanent**: never retried, the task fails immediately

use thiserror::Error;

/// Category of error for determining retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient,
    Permanent,
}

/// Errors produced by tasks and by the queue that runs them
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Task body failed. The message is surfaced verbatim as the task error.
    #[error("{message}")]
    Failed {
        message: String,
        category: ErrorCategory,
    },

    /// Payload could not be decoded into the task's input type
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// No task is registered under this name
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// The worker has stopped accepting tasks
    #[error("Task queue is closed")]
    QueueClosed,

    /// The worker stopped before the task got a slot
    #[error("Worker shut down before the task started")]
    WorkerShutdown,
}

impl TaskError {
    /// Create a transient failure (retried according to the task's policy)
    pub fn transient(message: impl Into<String>) -> Self {
        TaskError::Failed {
            message: message.into(),
            category: ErrorCategory::Transient,
        }
    }

    /// Create a permanent failure (never retried)
    pub fn permanent(message: impl Into<String>) -> Self {
        TaskError::Failed {
            message: message.into(),
            category: ErrorCategory::Permanent,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TaskError::Failed { category, .. } => *category,
            TaskError::InvalidPayload(_) => ErrorCategory::Permanent,
            TaskError::UnknownTask(_) => ErrorCategory::Permanent,
            TaskError::QueueClosed => ErrorCategory::Permanent,
            TaskError::WorkerShutdown => ErrorCategory::Permanent,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::InvalidPayload(err.to_string())
    }
}
