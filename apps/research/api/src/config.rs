use core_config::{FromEnv, Settings, env_parse, load_dotenv};
use domain_research::tasks::TaskSettings;
use std::sync::Arc;
use task_worker::WorkerConfig;

/// Application-specific configuration.
/// Composes the shared `Settings` with the worker and task knobs.
#[derive(Clone, Debug)]
pub struct Config {
    pub settings: Arc<Settings>,
    pub worker: WorkerConfig,
    pub tasks: TaskSettings,
}

impl Config {
    /// Loads `.env` (if any) and then reads the process environment.
    pub fn from_env() -> eyre::Result<Self> {
        load_dotenv();

        let settings = Settings::from_env()?;
        let defaults = WorkerConfig::default();
        let worker = defaults.clone().with_max_concurrent_jobs(env_parse(
            "WORKER_MAX_CONCURRENT_JOBS",
            defaults.max_concurrent_jobs,
        )?);

        Ok(Self {
            settings: Arc::new(settings),
            worker,
            tasks: TaskSettings::default(),
        })
    }
}
