use async_trait::async_trait;
use dns_reputation_domain::{Domain, LookupErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Reputation data returned by the remote service for one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationPayload {
    pub score: i64,
    pub categories: Vec<String>,
}

impl ReputationPayload {
    pub fn new(score: i64, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            score,
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// The service asked us to slow down ("too many requests").
    #[error("remote service is throttling requests")]
    RateLimited { retry_after: Option<Duration> },

    #[error("remote service returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
}

impl ServiceError {
    /// Error kind recorded for a failed attempt.
    pub fn kind(&self) -> LookupErrorKind {
        match self {
            ServiceError::RateLimited { .. } => LookupErrorKind::RateLimited,
            ServiceError::Status { code, .. } => LookupErrorKind::RemoteError(*code),
            ServiceError::Transport(_) | ServiceError::InvalidPayload(_) => {
                LookupErrorKind::Transport
            }
        }
    }
}

/// Port to the remote reputation service.
///
/// One call is one outbound request. Retry, timeout and throttling policy
/// live in [`crate::services::LookupClient`]; implementations only translate
/// the wire protocol into [`ReputationPayload`] / [`ServiceError`].
#[async_trait]
pub trait ReputationService: Send + Sync {
    async fn query(&self, domain: &Domain) -> Result<ReputationPayload, ServiceError>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str {
        "reputation-service"
    }
}
