//! CLI configuration, resolved from a JSON file, then the environment, then
//! command-line flags. Later sources win.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use playground_api::{construct_endpoint_url, ClientConfig, DEFAULT_PLAYGROUND_ENDPOINT};
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "PLAYGROUND_CONFIG_PATH";
pub const ENDPOINT_ENV: &str = "PLAYGROUND_ENDPOINT";
pub const AGENT_ID_ENV: &str = "PLAYGROUND_AGENT_ID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("timeout_sec must be greater than zero")]
    InvalidTimeout,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub agent_id: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    agent_id: Option<String>,
    #[serde(default)]
    timeout_sec: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Normalized base URL.
    pub endpoint: String,
    /// Agent to select after the agent list loads, instead of the first one.
    pub agent_id: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PLAYGROUND_ENDPOINT.to_string(),
            agent_id: None,
            timeout: None,
        }
    }
}

impl CliConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config_path = overrides
            .config_path
            .clone()
            .or_else(|| env_value(CONFIG_PATH_ENV).map(PathBuf::from));
        let file = match config_path {
            Some(path) => load_file(&path)?,
            None => FileConfig::default(),
        };

        let endpoint = non_blank(overrides.endpoint.as_deref())
            .or_else(|| env_value(ENDPOINT_ENV))
            .or_else(|| non_blank(file.endpoint.as_deref()));
        let agent_id = non_blank(overrides.agent_id.as_deref())
            .or_else(|| env_value(AGENT_ID_ENV))
            .or_else(|| non_blank(file.agent_id.as_deref()));
        let timeout_sec = overrides.timeout_sec.or(file.timeout_sec);

        let timeout = match timeout_sec {
            Some(0) => return Err(ConfigError::InvalidTimeout),
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        let endpoint = endpoint
            .map(|value| construct_endpoint_url(&value))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYGROUND_ENDPOINT.to_string());

        Ok(Self {
            endpoint,
            agent_id,
            timeout,
        })
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.endpoint.clone()).with_user_agent(concat!(
            "playground/",
            env!("CARGO_PKG_VERSION")
        ));
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn env_value(key: &str) -> Option<String> {
    non_blank(env::var(key).ok().as_deref())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
