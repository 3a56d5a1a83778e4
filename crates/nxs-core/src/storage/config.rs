//! Configuration management
//!
//! Settings live in `~/.config/nxstools/config.toml`. Environment variables
//! take priority over the file: `NXS_REST_URL` for the gateway and
//! `TANGO_HOST` for the default Tango database.

use super::Result;
use crate::error::StorageError;
use crate::tango::TangoHost;
use crate::utils::retry::PollPolicy;
use dirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REST_URL: &str = "http://localhost:8080";
pub const REST_URL_ENV: &str = "NXS_REST_URL";
pub const TANGO_HOST_ENV: &str = "TANGO_HOST";

/// Application configuration
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Tango REST gateway base URL
    pub rest_url: Option<String>,
    /// Default Tango database, `host:port`
    pub tango_host: Option<String>,
    /// Per-request timeout for gateway calls
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Busy-wait policy while servers start up or devices leave `RUNNING`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PollingConfig {
    pub attempts: Option<u32>,
    pub interval_ms: Option<u64>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(home_dir.join(".config").join("nxstools").join("config.toml"))
    }

    /// Gateway URL: environment, then file, then the local default
    pub fn get_rest_url(&self) -> String {
        first_non_empty(std::env::var(REST_URL_ENV).ok(), self.rest_url.clone())
            .unwrap_or_else(|| DEFAULT_REST_URL.to_string())
    }

    /// Default Tango host: environment, then file, then `localhost:10000`
    pub fn get_tango_host(&self) -> Result<TangoHost> {
        match first_non_empty(std::env::var(TANGO_HOST_ENV).ok(), self.tango_host.clone()) {
            Some(value) => value
                .parse()
                .map_err(|e: crate::error::DeviceError| StorageError::ConfigParseError {
                    message: format!("Invalid tango host '{}': {}", value, e),
                }),
            None => Ok(TangoHost::default()),
        }
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
            .unwrap_or(crate::tango::client::DEFAULT_TIMEOUT_SECS)
    }

    /// Polling policy; a check in flight may use one request timeout past the budget.
    pub fn poll_policy(&self) -> PollPolicy {
        let default = PollPolicy::default();
        PollPolicy::new(
            self.polling.attempts.unwrap_or(default.attempts).max(1),
            self.polling
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(default.interval),
        )
        .with_check_timeout(Duration::from_secs(self.timeout_seconds()))
    }
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.trim().is_empty())
        .or(fallback.filter(|s| !s.trim().is_empty()))
}
