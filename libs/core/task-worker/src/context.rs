use crate::state::Progress;
use crate::store::ResultStore;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Where progress updates go.
#[derive(Clone)]
enum ProgressSink {
    Store(ResultStore),
    Channel(mpsc::UnboundedSender<Progress>),
}

/// Handle passed to a running task.
///
/// Exposes the task's identity and lets the body report progress.
#[derive(Clone)]
pub struct TaskContext {
    task_id: Uuid,
    task_name: String,
    retries: u32,
    sink: ProgressSink,
}

impl TaskContext {
    pub(crate) fn for_store(
        task_id: Uuid,
        task_name: impl Into<String>,
        retries: u32,
        store: ResultStore,
    ) -> Self {
        Self {
            task_id,
            task_name: task_name.into(),
            retries,
            sink: ProgressSink::Store(store),
        }
    }

    /// A context that is not backed by a worker.
    ///
    /// Used to call a task body directly; progress updates arrive on the
    /// returned receiver.
    pub fn detached(task_name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<Progress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = Self {
            task_id: Uuid::new_v4(),
            task_name: task_name.into(),
            retries: 0,
            sink: ProgressSink::Channel(tx),
        };
        (ctx, rx)
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Retries already performed before this attempt.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Publish `PROGRESS` with `{current, total}`.
    pub fn update_progress(&self, current: u64, total: u64) {
        debug!(task_id = %self.task_id, current, total, "Task progress");

        let progress = Progress { current, total };
        match &self.sink {
            ProgressSink::Store(store) => {
                store.record_progress(&self.task_id, progress);
            }
            ProgressSink::Channel(tx) => {
                // Receiver may be gone when the caller doesn't care about progress.
                let _ = tx.send(progress);
            }
        }
    }
}
