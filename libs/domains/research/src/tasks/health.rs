//! `health_check` task.
//!
//! Reports host utilisation when a [`SystemSampler`] is configured. The task
//! itself never fails: sampling errors are reported as `unhealthy`.

use super::HEALTH_CHECK;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use task_worker::{Task, TaskContext, TaskError};
use tracing::{debug, warn};

/// One utilisation sample, all values in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Source of host utilisation figures. Sampling may block.
pub trait SystemSampler: Send + Sync {
    fn sample(&self) -> eyre::Result<SystemSnapshot>;
}

/// Sampler backed by `sysinfo`.
#[cfg(feature = "system-metrics")]
pub struct SysinfoSampler;

#[cfg(feature = "system-metrics")]
impl SystemSampler for SysinfoSampler {
    fn sample(&self) -> eyre::Result<SystemSnapshot> {
        use sysinfo::{Disks, System};

        let mut sys = System::new();
        // CPU usage is a delta between two refreshes.
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let total_memory = sys.total_memory();
        if total_memory == 0 {
            eyre::bail!("total memory reported as zero");
        }

        let disks = Disks::new_with_refreshed_list();
        let (disk_total, disk_available) = disks.list().iter().fold((0u64, 0u64), |acc, disk| {
            (acc.0 + disk.total_space(), acc.1 + disk.available_space())
        });

        Ok(SystemSnapshot {
            cpu_percent: f64::from(sys.global_cpu_usage()),
            memory_percent: percent(sys.used_memory(), total_memory),
            disk_percent: percent(disk_total.saturating_sub(disk_available), disk_total),
        })
    }
}

#[cfg(feature = "system-metrics")]
fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 1000.0).round() / 10.0
}

pub struct HealthCheckTask {
    sampler: Option<Arc<dyn SystemSampler>>,
}

impl HealthCheckTask {
    pub fn new(sampler: Option<Arc<dyn SystemSampler>>) -> Self {
        Self { sampler }
    }
}

#[async_trait]
impl Task for HealthCheckTask {
    fn name(&self) -> &'static str {
        HEALTH_CHECK
    }

    async fn run(&self, ctx: &TaskContext, _payload: Value) -> Result<Value, TaskError> {
        let Some(sampler) = self.sampler.clone() else {
            debug!(task_id = %ctx.task_id(), "No system sampler configured, reporting minimal health");
            return Ok(json!({
                "status": "healthy",
                "timestamp": Utc::now().to_rfc3339(),
            }));
        };

        let sampled = tokio::task::spawn_blocking(move || sampler.sample())
            .await
            .map_err(|e| eyre::eyre!("system sampler panicked: {e}"))
            .and_then(|result| result);

        let timestamp = Utc::now().to_rfc3339();
        match sampled {
            Ok(snapshot) => Ok(json!({
                "status": "healthy",
                "cpu_percent": snapshot.cpu_percent,
                "memory_percent": snapshot.memory_percent,
                "disk_percent": snapshot.disk_percent,
                "timestamp": timestamp,
            })),
            Err(e) => {
                warn!(task_id = %ctx.task_id(), error = %e, "Health check sampling failed");
                Ok(json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                    "timestamp": timestamp,
                }))
            }
        }
    }
}

#[cfg(all(test, feature = "system-metrics"))]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(10, 10), 100.0);
    }
}
