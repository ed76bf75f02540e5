//! In-memory result backend.
//!
//! Every task gets a `watch` channel holding its latest [`TaskStatus`], so
//! callers can either poll with [`ResultStore::get`] or await a change with
//! [`ResultStore::subscribe`]. Finished tasks are dropped by
//! [`ResultStore::evict_expired`] once their result has been kept long enough.

use crate::state::{Progress, TaskState, TaskStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::warn;
use uuid::Uuid;

struct Entry {
    tx: watch::Sender<TaskStatus>,
    /// Set when the task reaches `SUCCESS` or `FAILURE`
    finished_at: Option<Instant>,
}

#[derive(Clone, Default)]
pub struct ResultStore {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task in `PENDING`.
    pub fn insert_pending(&self, task_id: Uuid, task_name: &str) {
        let (tx, _) = watch::channel(TaskStatus::pending(task_id, task_name));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                task_id,
                Entry {
                    tx,
                    finished_at: None,
                },
            );
    }

    pub fn get(&self, task_id: &Uuid) -> Option<TaskStatus> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .map(|entry| entry.tx.borrow().clone())
    }

    pub fn subscribe(&self, task_id: &Uuid) -> Option<watch::Receiver<TaskStatus>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .map(|entry| entry.tx.subscribe())
    }

    /// Wait until the task reaches `SUCCESS` or `FAILURE`.
    ///
    /// Returns `None` for unknown task IDs, or if the task is evicted first.
    pub async fn wait_for_completion(&self, task_id: &Uuid) -> Option<TaskStatus> {
        let mut rx = self.subscribe(task_id)?;
        let status = rx.wait_for(|status| status.state.is_terminal()).await.ok()?;
        Some(status.clone())
    }

    /// Move a task to `next`, applying `update` to the status on success.
    ///
    /// Illegal transitions are logged and ignored; the return value tells
    /// whether the status changed.
    pub fn transition<F>(&self, task_id: &Uuid, next: TaskState, update: F) -> bool
    where
        F: FnOnce(&mut TaskStatus),
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get_mut(task_id) else {
            warn!(task_id = %task_id, state = %next, "Transition for unknown task");
            return false;
        };

        let changed = entry.tx.send_if_modified(|status| {
            if !status.state.can_transition_to(next) {
                warn!(
                    task_id = %task_id,
                    from = %status.state,
                    to = %next,
                    "Ignoring illegal task state transition"
                );
                return false;
            }

            status.state = next;
            update(status);
            if next != TaskState::Progress {
                status.progress = None;
            }
            status.updated_at = Utc::now();
            true
        });

        if changed && next.is_terminal() {
            entry.finished_at = Some(Instant::now());
        }
        changed
    }

    /// Publish a `PROGRESS` update for a running task.
    pub fn record_progress(&self, task_id: &Uuid, progress: Progress) -> bool {
        self.transition(task_id, TaskState::Progress, |status| {
            status.progress = Some(progress);
        })
    }

    /// Drop finished tasks whose result is older than `ttl`.
    ///
    /// Returns the number of evicted tasks. Subscribers of an evicted task
    /// see the channel close.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| {
            entry
                .finished_at
                .is_none_or(|finished_at| finished_at.elapsed() < ttl)
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
