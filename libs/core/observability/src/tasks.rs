//! Task lifecycle metrics for the background worker.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Terminal outcome of a single task attempt, used as the `status` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failure,
    Retry,
}

impl TaskOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Success => "success",
            TaskOutcome::Failure => "failure",
            TaskOutcome::Retry => "retry",
        }
    }
}

/// Task metrics recorder
pub struct TaskMetrics;

impl TaskMetrics {
    /// A task was accepted onto the queue.
    pub fn record_received(task_name: &str) {
        counter!("tasks_received_total", "task" => task_name.to_string()).increment(1);
    }

    /// An attempt finished; records the outcome and how long it ran.
    pub fn record_attempt(task_name: &str, outcome: TaskOutcome, elapsed: Duration) {
        counter!(
            "tasks_processed_total",
            "task" => task_name.to_string(),
            "status" => outcome.as_str()
        )
        .increment(1);

        histogram!("task_duration_seconds", "task" => task_name.to_string())
            .record(elapsed.as_secs_f64());

        if outcome == TaskOutcome::Retry {
            counter!("tasks_retried_total", "task" => task_name.to_string()).increment(1);
        }
    }

    pub fn set_in_flight(count: usize) {
        gauge!("tasks_in_flight").set(count as f64);
    }
}
