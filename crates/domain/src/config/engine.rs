use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

/// Batch lookup engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Ceiling on outbound lookup attempts per second, shared by all lookups
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Lifetime of a cached lookup outcome, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Also cache failed outcomes (cancellations are never cached)
    #[serde(default = "default_true")]
    pub cache_failures: bool,

    /// Maximum lookups in flight at once; unbounded when absent
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: Option<usize>,

    /// Abort the whole batch after this many seconds; no limit when absent
    #[serde(default)]
    pub batch_timeout_secs: Option<u64>,
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.requests_per_second.is_finite() || self.requests_per_second <= 0.0 {
            return Err(ConfigError::invalid(
                "engine.requests_per_second",
                format!("{} is not a positive rate", self.requests_per_second),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid(
                "engine.cache_ttl_secs",
                "must be greater than zero",
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::invalid(
                "engine.max_concurrency",
                "must be greater than zero when set",
            ));
        }
        if self.batch_timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "engine.batch_timeout_secs",
                "must be greater than zero when set",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_failures: true,
            max_concurrency: default_max_concurrency(),
            batch_timeout_secs: None,
        }
    }
}

fn default_requests_per_second() -> f64 {
    10.0
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_max_concurrency() -> Option<usize> {
    Some(50)
}
