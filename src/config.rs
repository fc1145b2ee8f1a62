//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::fetch::RetryPolicy;
use crate::fetch::weather::DEFAULT_API_ENDPOINT;

pub const DEFAULT_STATIONS: &str = "ST101,ST202,ST303";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE_PATH: &str = "data/logs/envirowatch.log";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
    pub stations: Vec<String>,
    pub log_level: String,
    pub log_file_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which returns the raw value of an
    /// environment variable. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let attempts = match get("API_RETRY_ATTEMPTS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("API_RETRY_ATTEMPTS must be an integer, got {v:?}"))?,
            None => 3,
        };
        let timeout = seconds(get("API_TIMEOUT_SECONDS"), "API_TIMEOUT_SECONDS", 10.0)?;
        let backoff = seconds(get("API_BACKOFF_SECONDS"), "API_BACKOFF_SECONDS", 1.5)?;

        let stations = get("STATIONS")
            .unwrap_or_else(|| DEFAULT_STATIONS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            api_endpoint: get("API_ENDPOINT").unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            api_key: get("API_KEY"),
            retry: RetryPolicy {
                attempts,
                timeout,
                backoff,
            },
            stations,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file_path: PathBuf::from(
                get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            ),
        })
    }
}

fn seconds(raw: Option<String>, key: &str, default: f64) -> Result<Duration> {
    let secs = match raw {
        Some(v) => v
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{key} must be a number of seconds, got {v:?}"))?,
        None => default,
    };
    Duration::try_from_secs_f64(secs).with_context(|| format!("{key} out of range: {secs}"))
}
