//! Task lifecycle states and the status snapshot published for each task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of one task invocation.
///
/// ```text
/// PENDING ──> STARTED ──> PROGRESS* ──> SUCCESS
///    ^            │            │    └──> FAILURE
///    │            └────────────┴───────> RETRY ──(countdown)──┐
///    └────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[derive(Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Started,
    Progress,
    Success,
    Failure,
    Retry,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failure)
    }

    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        match (self, next) {
            (Pending, Started) | (Pending, Failure) => true,
            (Started | Progress, Progress | Success | Failure | Retry) => true,
            (Retry, Pending) => true,
            _ => false,
        }
    }
}

/// Transient `{current, total}` published by long-running tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

/// Latest known state of a task.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TaskStatus {
    pub task_id: Uuid,
    pub task_name: String,
    pub state: TaskState,
    /// Retries already scheduled for this task
    pub retries: u32,
    /// Only present while the task is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TaskStatus {
    pub fn pending(task_id: Uuid, task_name: impl Into<String>) -> Self {
        Self {
            task_id,
            task_name: task_name.into(),
            state: TaskState::Pending,
            retries: 0,
            progress: None,
            result: None,
            error: None,
            updated_at: Utc::now(),
        }
    }
}
