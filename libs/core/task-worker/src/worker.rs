//! The worker loop.
//!
//! `TaskWorker` owns the receiving end of the queue and executes tasks on
//! the tokio runtime, at most `max_concurrent_jobs` at a time. Each attempt
//! moves the task through the result store:
//!
//! - `STARTED` when the body begins
//! - `SUCCESS` with the returned value
//! - `RETRY` on a transient error the task's policy still allows, then
//!   `PENDING` again once the countdown elapses
//! - `FAILURE` otherwise, including panics and invalid payloads
//!
//! Finished results are evicted from the store once they are older than
//! `result_ttl`.

use crate::config::WorkerConfig;
use crate::context::TaskContext;
use crate::error::TaskError;
use crate::queue::{TaskMessage, TaskQueue};
use crate::registry::{Task, TaskRegistry};
use crate::state::TaskState;
use crate::store::ResultStore;
use futures::FutureExt;
use observability::{TaskMetrics, TaskOutcome};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Upper bound on how often expired results are swept
const RESULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A failed attempt waiting for its countdown.
struct ScheduledRetry {
    message: TaskMessage,
    countdown: Duration,
}

pub struct TaskWorker {
    config: WorkerConfig,
    queue: TaskQueue,
    receiver: mpsc::Receiver<TaskMessage>,
    /// Semaphore to limit concurrent task execution
    concurrency_semaphore: Arc<Semaphore>,
}

impl TaskWorker {
    pub fn new(registry: TaskRegistry, config: WorkerConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let queue = TaskQueue::new(sender, Arc::new(registry), ResultStore::new());
        let concurrency_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));

        Self {
            config,
            queue,
            receiver,
            concurrency_semaphore,
        }
    }

    /// Producer handle for enqueuing tasks.
    pub fn queue(&self) -> TaskQueue {
        self.queue.clone()
    }

    pub fn store(&self) -> ResultStore {
        self.queue.store().clone()
    }

    /// Run until `shutdown` flips to `true`.
    ///
    /// Running tasks are drained before this returns. Tasks that were
    /// queued but never started are marked `FAILURE`. Retries still
    /// counting down are dropped and stay in `RETRY`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            worker_id = %self.config.worker_id,
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            tasks = ?self.queue.registered(),
            "Starting task worker"
        );

        let mut in_flight: JoinSet<Option<ScheduledRetry>> = JoinSet::new();
        let mut scheduled: JoinSet<()> = JoinSet::new();

        let sweep_period = self
            .config
            .result_ttl
            .clamp(Duration::from_millis(1), RESULT_SWEEP_INTERVAL);
        let mut sweep =
            tokio::time::interval_at(tokio::time::Instant::now() + sweep_period, sweep_period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    TaskMetrics::set_in_flight(in_flight.len());
                    if let Some(retry) = Self::reap(joined) {
                        self.schedule_retry(&mut scheduled, retry);
                    }
                }

                Some(_) = scheduled.join_next(), if !scheduled.is_empty() => {}

                _ = sweep.tick() => {
                    let evicted = self.queue.store().evict_expired(self.config.result_ttl);
                    if evicted > 0 {
                        debug!(evicted, "Evicted expired task results");
                    }
                }

                message = self.receiver.recv() => {
                    let Some(message) = message else {
                        break;
                    };

                    let permit = tokio::select! {
                        permit = Arc::clone(&self.concurrency_semaphore).acquire_owned() => permit,
                        _ = shutdown.changed() => {
                            fail_unstarted(self.queue.store(), &message);
                            break;
                        }
                    };
                    let Ok(permit) = permit else {
                        fail_unstarted(self.queue.store(), &message);
                        break;
                    };

                    let Some(task) = self.queue.registry().get(&message.task_name) else {
                        error!(task = %message.task_name, "No task registered under this name");
                        self.queue.store().transition(&message.task_id, TaskState::Failure, |status| {
                            status.error = Some(TaskError::UnknownTask(message.task_name.clone()).to_string());
                        });
                        continue;
                    };

                    let store = self.queue.store().clone();
                    in_flight.spawn(async move {
                        let outcome = execute(task, store, message).await;
                        drop(permit);
                        outcome
                    });
                    TaskMetrics::set_in_flight(in_flight.len());
                }
            }
        }

        info!(
            running = in_flight.len(),
            pending_retries = scheduled.len(),
            "Task worker shutting down, draining running tasks"
        );

        scheduled.abort_all();

        self.receiver.close();
        let mut unstarted = 0usize;
        while let Ok(message) = self.receiver.try_recv() {
            fail_unstarted(self.queue.store(), &message);
            unstarted += 1;
        }
        if unstarted > 0 {
            warn!(unstarted, "Failed queued tasks that never started");
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Some(retry) = Self::reap(joined) {
                debug!(task_id = %retry.message.task_id, "Dropping retry scheduled during shutdown");
            }
        }
        TaskMetrics::set_in_flight(0);

        info!(worker_id = %self.config.worker_id, "Task worker stopped");
    }

    fn reap(
        joined: Result<Option<ScheduledRetry>, tokio::task::JoinError>,
    ) -> Option<ScheduledRetry> {
        joined.unwrap_or_else(|e| {
            error!(error = %e, "Task execution aborted");
            None
        })
    }

    fn schedule_retry(&self, scheduled: &mut JoinSet<()>, retry: ScheduledRetry) {
        let queue = self.queue.clone();
        scheduled.spawn(async move {
            tokio::time::sleep(retry.countdown).await;
            let task_id = retry.message.task_id;
            if let Err(e) = queue.requeue(retry.message).await {
                error!(task_id = %task_id, error = %e, "Failed to requeue task");
            }
        });
    }
}

/// Record a task the worker received but never ran.
fn fail_unstarted(store: &ResultStore, message: &TaskMessage) {
    warn!(task_id = %message.task_id, task = %message.task_name, "Worker shut down before the task started");
    store.transition(&message.task_id, TaskState::Failure, |status| {
        status.error = Some(TaskError::WorkerShutdown.to_string());
    });
}

/// Run one attempt and record its outcome.
async fn execute(
    task: Arc<dyn Task>,
    store: ResultStore,
    message: TaskMessage,
) -> Option<ScheduledRetry> {
    let task_id = message.task_id;
    let name = task.name();

    store.transition(&task_id, TaskState::Started, |status| {
        status.retries = message.retries;
    });
    debug!(task_id = %task_id, task = name, retries = message.retries, "Task started");

    let ctx = TaskContext::for_store(task_id, name, message.retries, store.clone());
    let start = Instant::now();

    let result = AssertUnwindSafe(task.run(&ctx, message.payload.clone()))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(TaskError::permanent(panic_message(panic.as_ref()))));

    let elapsed = start.elapsed();

    match result {
        Ok(value) => {
            store.transition(&task_id, TaskState::Success, |status| {
                status.result = Some(value);
                status.error = None;
            });
            TaskMetrics::record_attempt(name, TaskOutcome::Success, elapsed);
            info!(task_id = %task_id, task = name, elapsed_ms = elapsed.as_millis() as u64, "Task succeeded");
            None
        }
        Err(err) if err.is_retryable() && task.retry_policy().allows_retry(message.retries) => {
            let policy = task.retry_policy();
            let retries = message.retries + 1;

            store.transition(&task_id, TaskState::Retry, |status| {
                status.retries = retries;
                status.error = Some(err.to_string());
            });
            TaskMetrics::record_attempt(name, TaskOutcome::Retry, elapsed);
            warn!(
                task_id = %task_id,
                task = name,
                error = %err,
                retry = retries,
                max_retries = policy.max_retries,
                countdown_secs = policy.countdown.as_secs(),
                "Task failed, scheduling retry"
            );

            Some(ScheduledRetry {
                message: TaskMessage { retries, ..message },
                countdown: policy.countdown,
            })
        }
        Err(err) => {
            store.transition(&task_id, TaskState::Failure, |status| {
                status.error = Some(err.to_string());
            });
            TaskMetrics::record_attempt(name, TaskOutcome::Failure, elapsed);
            error!(
                task_id = %task_id,
                task = name,
                error = %err,
                error_category = ?err.category(),
                retries = message.retries,
                "Task failed"
            );
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("Task panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("Task panicked: {msg}")
    } else {
        "Task panicked".to_string()
    }
}
