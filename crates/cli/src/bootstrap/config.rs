use dns_reputation_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logged once the subscriber is up; loading happens before logging exists.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    info!(
        config_file = config_path.unwrap_or("default"),
        base_url = %config.api.base_url,
        authenticated = config.api.auth_token.is_some(),
        requests_per_second = config.engine.requests_per_second,
        max_retries = config.api.max_retries,
        attempt_timeout_ms = config.api.attempt_timeout_ms,
        max_concurrency = ?config.engine.max_concurrency,
        cache_ttl_secs = config.engine.cache_ttl_secs,
        "Configuration loaded"
    );
}
