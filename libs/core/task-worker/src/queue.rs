use crate::error::TaskError;
use crate::registry::TaskRegistry;
use crate::state::{TaskState, TaskStatus};
use crate::store::ResultStore;
use observability::TaskMetrics;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};
use uuid::Uuid;

/// One queued invocation.
#[derive(Debug, Clone)]
pub(crate) struct TaskMessage {
    pub task_id: Uuid,
    pub task_name: String,
    pub payload: Value,
    pub retries: u32,
}

/// Producer side of the worker. Cheap to clone.
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<TaskMessage>,
    registry: Arc<TaskRegistry>,
    store: ResultStore,
}

impl TaskQueue {
    pub(crate) fn new(
        sender: mpsc::Sender<TaskMessage>,
        registry: Arc<TaskRegistry>,
        store: ResultStore,
    ) -> Self {
        Self {
            sender,
            registry,
            store,
        }
    }

    /// Queue `task_name` with a JSON payload and return its task ID.
    ///
    /// The task is visible as `PENDING` before this returns.
    pub async fn enqueue(&self, task_name: &str, payload: Value) -> Result<Uuid, TaskError> {
        if !self.registry.contains(task_name) {
            return Err(TaskError::UnknownTask(task_name.to_string()));
        }

        let task_id = Uuid::now_v7();
        self.store.insert_pending(task_id, task_name);
        TaskMetrics::record_received(task_name);

        let message = TaskMessage {
            task_id,
            task_name: task_name.to_string(),
            payload,
            retries: 0,
        };

        self.send(message).await?;
        debug!(task_id = %task_id, task = task_name, "Task enqueued");
        Ok(task_id)
    }

    pub fn status(&self, task_id: &Uuid) -> Option<TaskStatus> {
        self.store.get(task_id)
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn registered(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    pub(crate) fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Put a retried task back on the queue after its countdown.
    pub(crate) async fn requeue(&self, message: TaskMessage) -> Result<(), TaskError> {
        self.store.transition(&message.task_id, TaskState::Pending, |_| {});
        self.send(message).await
    }

    async fn send(&self, message: TaskMessage) -> Result<(), TaskError> {
        let task_id = message.task_id;
        if self.sender.send(message).await.is_err() {
            error!(task_id = %task_id, "Task queue closed, failing task");
            self.store.transition(&task_id, TaskState::Failure, |status| {
                status.error = Some(TaskError::QueueClosed.to_string());
            });
            return Err(TaskError::QueueClosed);
        }
        Ok(())
    }
}
