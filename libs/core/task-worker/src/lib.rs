//! Task Worker Framework
//!
//! An in-process runtime for background tasks.
//!
//! ## Features
//!
//! - **Task trait**: tasks are plain async functions over a JSON payload
//! - **Bounded worker pool**: concurrency limited by a semaphore
//! - **Retry policies**: per-task max retries and fixed countdown
//! - **Progress reporting**: explicit `update_progress` on the task context
//! - **Result store**: observe `PENDING → STARTED → PROGRESS → SUCCESS | FAILURE | RETRY`
//!
//! ## Example
//!
//! ```ignore
//! use task_worker::{Task, TaskContext, TaskError, TaskRegistry, TaskWorker, WorkerConfig};
//!
//! let registry = TaskRegistry::new().with(MyTask);
//! let worker = TaskWorker::new(registry, WorkerConfig::default());
//! let queue = worker.queue();
//!
//! tokio::spawn(worker.run(shutdown_rx));
//! let task_id = queue.enqueue("my_task", json!({})).await?;
//! ```

mod config;
mod context;
mod error;
mod queue;
mod registry;
mod retry;
mod state;
mod store;
mod worker;

pub use config::WorkerConfig;
pub use context::TaskContext;
pub use error::{ErrorCategory, TaskError};
pub use queue::TaskQueue;
pub use registry::{Task, TaskRegistry};
pub use retry::RetryPolicy;
pub use state::{Progress, TaskState, TaskStatus};
pub use store::ResultStore;
pub use worker::TaskWorker;
