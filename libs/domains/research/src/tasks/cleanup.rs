use super::CLEANUP_OLD_FILES;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use task_worker::{Task, TaskContext, TaskError};
use tracing::info;

/// Periodic cleanup hook. Removes nothing yet and always reports zero files.
pub struct CleanupOldFilesTask {
    directory: PathBuf,
}

impl CleanupOldFilesTask {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Task for CleanupOldFilesTask {
    fn name(&self) -> &'static str {
        CLEANUP_OLD_FILES
    }

    async fn run(&self, ctx: &TaskContext, _payload: Value) -> Result<Value, TaskError> {
        info!(task_id = %ctx.task_id(), directory = %self.directory.display(), "Starting cleanup");
        let cleaned_files = 0u64;
        info!(task_id = %ctx.task_id(), cleaned_files, "Cleanup completed");

        Ok(json!({
            "status": "completed",
            "cleaned_files": cleaned_files,
            "directory": self.directory.display().to_string(),
        }))
    }
}
