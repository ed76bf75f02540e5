use super::{PROCESS_DATA, parse_payload};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use task_worker::{RetryPolicy, Task, TaskContext, TaskError};
use tracing::{error, info};

const DEFAULT_TOTAL: u64 = 100;
/// Retries after the first attempt
const MAX_RETRIES: u32 = 3;
const RETRY_COUNTDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ProcessDataInput {
    total: u64,
}

impl Default for ProcessDataInput {
    fn default() -> Self {
        Self {
            total: DEFAULT_TOTAL,
        }
    }
}

/// Per-item work for `process_data`.
#[async_trait]
pub trait DataProcessor: Send + Sync {
    /// Process item `current` of `total` (1-based).
    async fn process_item(&self, current: u64, total: u64) -> eyre::Result<()>;
}

/// Stand-in processor that only waits a fixed delay per item.
pub struct SimulatedProcessor {
    step_delay: Duration,
}

impl SimulatedProcessor {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

#[async_trait]
impl DataProcessor for SimulatedProcessor {
    async fn process_item(&self, _current: u64, _total: u64) -> eyre::Result<()> {
        tokio::time::sleep(self.step_delay).await;
        Ok(())
    }
}

/// Processes `total` items, publishing progress after each one.
///
/// Any processing error is retried up to three times, 60 seconds apart.
/// `MAX_RETRIES` counts retries, not attempts: a run that keeps failing is
/// tried four times before it ends in `FAILURE`.
pub struct ProcessDataTask {
    processor: Arc<dyn DataProcessor>,
}

impl ProcessDataTask {
    pub fn new(processor: Arc<dyn DataProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl Task for ProcessDataTask {
    fn name(&self) -> &'static str {
        PROCESS_DATA
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(MAX_RETRIES, RETRY_COUNTDOWN)
    }

    async fn run(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let ProcessDataInput { total } = parse_payload(payload)?;
        info!(task_id = %ctx.task_id(), total, attempt = ctx.retries() + 1, "Processing data");

        for current in 1..=total {
            if let Err(e) = self.processor.process_item(current, total).await {
                error!(
                    task_id = %ctx.task_id(),
                    current,
                    total,
                    error = %e,
                    "Data processing failed"
                );
                return Err(TaskError::transient(e.to_string()));
            }
            ctx.update_progress(current, total);
        }

        info!(task_id = %ctx.task_id(), processed_items = total, "Data processing completed");

        Ok(json!({
            "status": "completed",
            "processed_items": total,
            "task_id": ctx.task_id().to_string(),
        }))
    }
}
