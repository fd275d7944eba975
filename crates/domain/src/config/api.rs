use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

/// Remote reputation service configuration
///
/// Endpoint and credentials are never compiled in: `base_url` must be set in
/// the config file (or `--base-url`) and the token may come from the
/// `DNS_REPUTATION_API_TOKEN` environment variable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Lookup URL prefix; the domain is appended as the last path segment
    #[serde(default)]
    pub base_url: String,

    /// Header carrying the credential (default: "Authorization")
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Credential value, sent verbatim in `auth_header`
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Hard timeout for a single attempt, in milliseconds
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Connection establishment timeout, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Total attempts per domain for transport, timeout and status failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Cooldown after a "too many requests" answer without a Retry-After hint
    #[serde(default = "default_rate_limit_cooldown_secs")]
    pub rate_limit_cooldown_secs: u64,

    /// Cooldown retries allowed per domain before giving up as rate limited.
    /// These do not consume `max_retries`.
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,

    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl ApiConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("api.base_url"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::invalid(
                "api.base_url",
                "URL must start with http:// or https://",
            ));
        }
        if self.auth_header.trim().is_empty() {
            return Err(ConfigError::invalid("api.auth_header", "cannot be empty"));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "api.attempt_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::invalid(
                "api.max_retries",
                "at least one attempt is required",
            ));
        }
        self.backoff.validate()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_header: default_auth_header(),
            auth_token: None,
            attempt_timeout_ms: default_attempt_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_retries: default_max_retries(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown_secs(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            backoff: BackoffConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    Fixed,
    #[default]
    Exponential,
}

/// Delay between failed attempts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackoffConfig {
    #[serde(default)]
    pub strategy: BackoffStrategy,

    /// Fixed delay, or the first delay of the exponential sequence
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for exponential delays
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Randomize each delay within [50%, 100%] of its nominal value
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl BackoffConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ConfigError::invalid(
                "api.backoff.max_delay_ms",
                format!(
                    "{} is lower than base_delay_ms ({})",
                    self.max_delay_ms, self.base_delay_ms
                ),
            ));
        }
        Ok(())
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::default(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_attempt_timeout_ms() -> u64 {
    5000
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit_cooldown_secs() -> u64 {
    15
}

fn default_max_rate_limit_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_jitter() -> bool {
    true
}
