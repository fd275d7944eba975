//! DNS Reputation Domain Layer
pub mod config;
pub mod domain_name;
pub mod errors;
pub mod lookup_result;
pub mod report;
pub mod reputation;

pub use config::{CliOverrides, Config, ConfigError};
pub use domain_name::Domain;
pub use errors::DomainError;
pub use lookup_result::{AttemptError, LookupErrorKind, LookupFailure, LookupResult, LookupSuccess};
pub use report::{BatchReport, CaptureStats, LookupStats, ResponseTimeStats};
pub use reputation::{Classification, TRUSTED_MIN_SCORE};
