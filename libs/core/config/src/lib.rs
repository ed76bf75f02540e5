pub mod server;
pub mod settings;
pub mod tracing;

pub use settings::Settings;

use std::env;
use std::str::FromStr;
use std::sync::Once;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment (dev = DEBUG on, prod = everything else)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load and parse environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, falling back to `default` when unset.
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Boolean flag with the usual spellings (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("'{}' is not a boolean", other),
        }),
    }
}

static DOTENV: Once = Once::new();

/// Load variables from a `.env` file in the working directory (or a parent).
///
/// Variables already present in the process environment are never overridden.
/// A missing file is fine; only the first call does any work.
pub fn load_dotenv() {
    DOTENV.call_once(|| match dotenvy::dotenv() {
        Ok(path) => ::tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => ::tracing::warn!("Failed to load .env file: {}", e),
    });
}
