//! Application state management.
//!
//! Shared by every request handler; all fields are cheap to clone.

use core_config::Settings;
use std::sync::Arc;
use std::time::Instant;
use task_worker::TaskQueue;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Handle to the in-process task worker
    pub queue: TaskQueue,
    /// Used for the `uptime` of the detailed health report
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, queue: TaskQueue) -> Self {
        Self {
            settings,
            queue,
            started_at: Instant::now(),
        }
    }
}
