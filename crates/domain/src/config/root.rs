use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{ApiConfig, ConfigError, EngineConfig, InputConfig, InputFormat, LoggingConfig, OutputConfig};

/// Environment variable overriding `api.auth_token`.
pub const API_TOKEN_ENV: &str = "DNS_REPUTATION_API_TOKEN";

const DEFAULT_CONFIG_PATHS: &[&str] = &["dns-reputation.toml", "config/dns-reputation.toml"];

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub format: Option<InputFormat>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub requests_per_second: Option<f64>,
    pub max_retries: Option<u32>,
    pub attempt_timeout_ms: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `config_path`, or from the first default
    /// location that exists, then apply the environment and CLI overrides.
    pub fn load(config_path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => Some(PathBuf::from(p)),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_token(std::env::var(API_TOKEN_ENV).ok());
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.api.auth_token = Some(token);
        }
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(input) = overrides.input {
            self.input.path = Some(input);
        }
        if let Some(format) = overrides.format {
            self.input.format = format;
        }
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if let Some(url) = overrides.base_url {
            self.api.base_url = url;
        }
        if let Some(rps) = overrides.requests_per_second {
            self.engine.requests_per_second = rps;
        }
        if let Some(retries) = overrides.max_retries {
            self.api.max_retries = retries;
        }
        if let Some(timeout) = overrides.attempt_timeout_ms {
            self.api.attempt_timeout_ms = timeout;
        }
        if let Some(concurrency) = overrides.max_concurrency {
            self.engine.max_concurrency = Some(concurrency);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Reject configurations that cannot start a batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.engine.validate()?;
        if self.input.path.is_none() {
            return Err(ConfigError::Missing("input.path"));
        }
        Ok(())
    }
}
