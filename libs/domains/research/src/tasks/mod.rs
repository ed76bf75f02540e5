//! Background tasks executed by the task worker.
//!
//! | Name | Retries | Result |
//! |---|---|---|
//! | `process_data` | 3, 60 s apart | `{status, processed_items, task_id}` |
//! | `send_email` | none | `{status, recipient, subject}` |
//! | `cleanup_old_files` | none | `{status, cleaned_files, directory}` |
//! | `health_check` | none | `{status, ..., timestamp}` |

pub mod cleanup;
pub mod email;
pub mod health;
pub mod process_data;

pub use cleanup::CleanupOldFilesTask;
pub use email::{EmailMessage, EmailTransport, SendEmailTask, SimulatedTransport};
pub use health::{HealthCheckTask, SystemSampler, SystemSnapshot};
pub use process_data::{DataProcessor, ProcessDataTask, SimulatedProcessor};

#[cfg(feature = "system-metrics")]
pub use health::SysinfoSampler;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use task_worker::{TaskError, TaskRegistry};

pub const PROCESS_DATA: &str = "process_data";
pub const SEND_EMAIL: &str = "send_email";
pub const CLEANUP_OLD_FILES: &str = "cleanup_old_files";
pub const HEALTH_CHECK: &str = "health_check";

/// Knobs for the default task implementations.
#[derive(Debug, Clone)]
pub struct TaskSettings {
    /// Simulated work per `process_data` item
    pub process_step_delay: Duration,
    /// Simulated delivery time for `send_email`
    pub email_delay: Duration,
    /// Directory reported by `cleanup_old_files`
    pub cleanup_directory: PathBuf,
    /// Sample host CPU/memory/disk in `health_check` when available
    pub collect_system_metrics: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            process_step_delay: Duration::from_millis(100),
            email_delay: Duration::from_secs(2),
            cleanup_directory: PathBuf::from("/tmp"),
            collect_system_metrics: true,
        }
    }
}

/// Registry with all four tasks under their public names.
pub fn default_registry(settings: &TaskSettings) -> TaskRegistry {
    TaskRegistry::new()
        .with(ProcessDataTask::new(Arc::new(SimulatedProcessor::new(
            settings.process_step_delay,
        ))))
        .with(SendEmailTask::new(Arc::new(SimulatedTransport::new(
            settings.email_delay,
        ))))
        .with(CleanupOldFilesTask::new(settings.cleanup_directory.clone()))
        .with(HealthCheckTask::new(system_sampler(settings)))
}

#[cfg(feature = "system-metrics")]
fn system_sampler(settings: &TaskSettings) -> Option<Arc<dyn SystemSampler>> {
    settings
        .collect_system_metrics
        .then(|| Arc::new(SysinfoSampler) as Arc<dyn SystemSampler>)
}

#[cfg(not(feature = "system-metrics"))]
fn system_sampler(_settings: &TaskSettings) -> Option<Arc<dyn SystemSampler>> {
    None
}

/// Decode a task payload; `null` means "all defaults".
fn parse_payload<T>(payload: Value) -> Result<T, TaskError>
where
    T: DeserializeOwned + Default,
{
    if payload.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Input {
        total: u64,
    }

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry(&TaskSettings::default());
        assert_eq!(
            registry.names(),
            vec![CLEANUP_OLD_FILES, HEALTH_CHECK, PROCESS_DATA, SEND_EMAIL]
        );
    }

    #[test]
    fn test_parse_payload_null_is_default() {
        assert_eq!(parse_payload::<Input>(Value::Null).unwrap(), Input::default());
        assert_eq!(parse_payload::<Input>(json!({"total": 7})).unwrap(), Input { total: 7 });
    }

    #[test]
    fn test_parse_payload_rejects_wrong_types() {
        let err = parse_payload::<Input>(json!({"total": "seven"})).unwrap_err();
        assert!(matches!(err, TaskError::InvalidPayload(_)));
        assert!(!err.is_retryable());
    }
}
