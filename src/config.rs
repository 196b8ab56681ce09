//! Runtime configuration
//!
//! Everything is injected into the components at construction; nothing here
//! is process-wide mutable state.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const DEFAULT_LOG_DIR: &str = ".logs";

const ENV_SERVER_URL: &str = "CATALOG_PLAYER_SERVER_URL";
const ENV_TIMEOUT_SECS: &str = "CATALOG_PLAYER_TIMEOUT_SECS";
const ENV_LOG_DIR: &str = "CATALOG_PLAYER_LOG_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid server URL `{value}`: {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("Invalid value for {key}: `{value}`")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base address of the catalog/streaming service
    pub server_url: Url,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub log_dir: PathBuf,
    /// How often the interactive loop advances the playback position
    pub tick_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            tick_interval: Duration::from_millis(250),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SERVER_URL) {
            config.server_url = parse_server_url(&value)?;
        }

        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                value: value.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue { key: ENV_TIMEOUT_SECS, value });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = lookup(ENV_LOG_DIR) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue { key: ENV_LOG_DIR, value });
            }
            config.log_dir = PathBuf::from(value);
        }

        Ok(config)
    }
}

fn parse_server_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(url)
}
