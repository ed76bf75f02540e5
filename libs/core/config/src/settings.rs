//! Process-wide application settings.
//!
//! `Settings` is resolved once at startup from the environment (and an
//! optional `.env` file) and then shared read-only, usually as
//! `Arc<Settings>` inside the application state.

use crate::server::{ServerConfig, DEFAULT_PORT};
use crate::{env_flag, env_or_default, env_parse, ConfigError, Environment, FromEnv};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

pub const DEFAULT_APP_NAME: &str = "Research Pipeline API";
pub const DEFAULT_ALLOWED_HOSTS: &str = "http://localhost:3000,http://localhost:8000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./research.db";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;
pub const DEFAULT_PIPELINE_PATH: &str = "../research_pipeline";
pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

#[derive(Clone)]
pub struct Settings {
    pub app_name: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub allowed_hosts: Vec<String>,
    pub database_url: String,
    pub redis_url: String,
    pub upload_folder: PathBuf,
    /// Maximum accepted request body, in bytes.
    pub max_upload_size: usize,
    pub openai_api_key: Option<String>,
    pub research_pipeline_path: PathBuf,
    pub secret_key: String,
}

impl Settings {
    pub fn server(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
    }

    pub fn environment(&self) -> Environment {
        Environment::from_debug(self.debug)
    }

    pub fn has_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

impl FromEnv for Settings {
    fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = Some(env_or_default("OPENAI_API_KEY", ""))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            app_name: env_or_default("APP_NAME", DEFAULT_APP_NAME),
            debug: env_flag("DEBUG", false)?,
            host: env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string()),
            port: env_parse("PORT", DEFAULT_PORT)?,
            allowed_hosts: parse_list(
                "ALLOWED_HOSTS",
                &env_or_default("ALLOWED_HOSTS", DEFAULT_ALLOWED_HOSTS),
            )?,
            database_url: env_or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            redis_url: env_or_default("REDIS_URL", DEFAULT_REDIS_URL),
            upload_folder: PathBuf::from(env_or_default("UPLOAD_FOLDER", DEFAULT_UPLOAD_FOLDER)),
            max_upload_size: env_parse("MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE)?,
            openai_api_key,
            research_pipeline_path: PathBuf::from(env_or_default(
                "RESEARCH_PIPELINE_PATH",
                DEFAULT_PIPELINE_PATH,
            )),
            secret_key: env_or_default("SECRET_KEY", DEFAULT_SECRET_KEY),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            debug: false,
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: DEFAULT_PORT,
            allowed_hosts: split_csv(DEFAULT_ALLOWED_HOSTS),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            openai_api_key: None,
            research_pipeline_path: PathBuf::from(DEFAULT_PIPELINE_PATH),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("debug", &self.debug)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_hosts", &self.allowed_hosts)
            .field("database_url", &self.database_url)
            .field("redis_url", &self.redis_url)
            .field("upload_folder", &self.upload_folder)
            .field("max_upload_size", &self.max_upload_size)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("research_pipeline_path", &self.research_pipeline_path)
            .field("secret_key", &"***")
            .finish()
    }
}

/// Accepts either a JSON array (`["a","b"]`) or a comma-separated string.
fn parse_list(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(trimmed).map_err(|e| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        });
    }

    Ok(split_csv(trimmed))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
