//! Worker configuration
//!
//! This module provides `WorkerConfig` for configuring the task worker.

use std::time::Duration;
use uuid::Uuid;

/// How long finished task results are kept, matching the usual one-day
/// result expiry of task queues
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the task worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Unique worker ID used in logs (auto-generated if not provided)
    pub worker_id: String,

    /// Maximum concurrent tasks to execute
    pub max_concurrent_jobs: usize,

    /// Number of queued tasks buffered before `enqueue` waits
    pub queue_capacity: usize,

    /// How long a `SUCCESS` or `FAILURE` result stays queryable
    pub result_ttl: Duration,
}

impl WorkerConfig {
    pub fn new() -> Self {
        Self {
            worker_id: format!("worker-{}", Uuid::new_v4()),
            max_concurrent_jobs: 4,
            queue_capacity: 1024,
            result_ttl: DEFAULT_RESULT_TTL,
        }
    }

    /// Set the worker ID
    pub fn with_worker_id(mut self, id: impl Into<String>) -> Self {
        self.worker_id = id.into();
        self
    }

    /// Set the maximum number of tasks executing at once (at least 1)
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    /// Set the queue buffer size (at least 1)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set how long finished results are kept
    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new()
    }
}
