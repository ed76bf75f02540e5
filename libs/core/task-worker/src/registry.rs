//! Task trait and the name-keyed registry the worker dispatches from.

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A named unit of background work.
///
/// # Example
///
/// ```rust,ignore
/// use task_worker::{Task, TaskContext, TaskError};
///
/// struct Cleanup;
///
/// #[async_trait]
/// impl Task for Cleanup {
///     fn name(&self) -> &'static str {
///         "cleanup_old_files"
///     }
///
///     async fn run(&self, _ctx: &TaskContext, _payload: Value) -> Result<Value, TaskError> {
///         Ok(json!({"status": "completed"}))
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Registry key, also the `task` metrics label.
    fn name(&self) -> &'static str;

    /// Default: never retry.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::none()
    }

    async fn run(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError>;
}

#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<&'static str, Arc<dyn Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing any previous task with the same name.
    pub fn register<T: Task>(&mut self, task: T) {
        self.tasks.insert(task.name(), Arc::new(task));
    }

    pub fn with<T: Task>(mut self, task: T) -> Self {
        self.register(task);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tasks.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo(&'static str);

    #[async_trait]
    impl Task for Echo {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn run(&self, _ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
            Ok(payload)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TaskRegistry::new().with(Echo("b_task")).with(Echo("a_task"));

        assert!(registry.contains("a_task"));
        assert!(!registry.contains("missing"));
        assert_eq!(registry.names(), vec!["a_task", "b_task"]);
        assert_eq!(registry.get("a_task").unwrap().retry_policy(), RetryPolicy::none());
    }

    #[tokio::test]
    async fn test_registered_task_runs() {
        let registry = TaskRegistry::new().with(Echo("echo"));
        let (ctx, _rx) = TaskContext::detached("echo");

        let task = registry.get("echo").unwrap();
        let out = task.run(&ctx, json!({"x": 1})).await.unwrap();
        assert_eq!(out, json!({"x": 1}));
    }
}
