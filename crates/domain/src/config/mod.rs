//! Configuration module for the DNS reputation analyzer
//!
//! One structure per TOML section:
//! - `root`: Main configuration and CLI overrides
//! - `api`: Remote reputation service endpoint, retry and backoff policy
//! - `engine`: Rate limit, cache and concurrency settings
//! - `input`: Domain source selection
//! - `output`: Report destinations
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod api;
pub mod engine;
pub mod errors;
pub mod input;
pub mod logging;
pub mod output;
pub mod root;

pub use api::{ApiConfig, BackoffConfig, BackoffStrategy};
pub use engine::EngineConfig;
pub use errors::ConfigError;
pub use input::{InputConfig, InputFormat};
pub use logging::LoggingConfig;
pub use output::OutputConfig;
pub use root::{CliOverrides, Config, API_TOKEN_ENV};
