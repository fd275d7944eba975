use crate::{Classification, Domain};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Why a lookup (or a single attempt of it) failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupErrorKind {
    /// No response within the per-attempt timeout.
    Timeout,
    /// The remote service kept throttling past the cooldown retry ceiling.
    RateLimited,
    /// Network-level failure or an unreadable response.
    Transport,
    /// Non-success status returned by the remote service.
    RemoteError(u16),
    /// All attempts were consumed without a success.
    RetriesExhausted,
    /// The batch was aborted before this domain resolved.
    Cancelled,
}

impl LookupErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupErrorKind::Timeout => "timeout",
            LookupErrorKind::RateLimited => "rate_limited",
            LookupErrorKind::Transport => "transport",
            LookupErrorKind::RemoteError(_) => "remote_error",
            LookupErrorKind::RetriesExhausted => "retries_exhausted",
            LookupErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupErrorKind::RemoteError(status) => write!(f, "remote_error({})", status),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Error observed on one attempt; kept on a failure as its last cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError {
    pub kind: LookupErrorKind,
    pub message: String,
}

impl AttemptError {
    pub fn new(kind: LookupErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupSuccess {
    pub domain: Domain,
    pub reputation_score: i64,
    pub categories: BTreeSet<String>,
    pub classification: Classification,
    /// Latency of the attempt that succeeded.
    pub response_time: Duration,
    /// Served from the reputation cache instead of the remote service.
    pub cached: bool,
}

impl LookupSuccess {
    pub fn new(
        domain: Domain,
        reputation_score: i64,
        categories: impl IntoIterator<Item = String>,
        response_time: Duration,
    ) -> Self {
        Self {
            domain,
            reputation_score,
            categories: categories.into_iter().collect(),
            classification: Classification::from_score(reputation_score),
            response_time,
            cached: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupFailure {
    pub domain: Domain,
    pub kind: LookupErrorKind,
    pub last_error: Option<AttemptError>,
    /// Attempts that counted against the retry budget.
    pub attempts: u32,
    /// Latency of the last completed attempt, if any attempt completed.
    pub response_time: Option<Duration>,
    pub cached: bool,
}

impl LookupFailure {
    pub fn new(domain: Domain, kind: LookupErrorKind) -> Self {
        Self {
            domain,
            kind,
            last_error: None,
            attempts: 0,
            response_time: None,
            cached: false,
        }
    }

    pub fn cancelled(domain: Domain) -> Self {
        Self::new(domain, LookupErrorKind::Cancelled)
    }

    pub fn with_last_error(mut self, error: AttemptError) -> Self {
        self.last_error = Some(error);
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_response_time(mut self, response_time: Option<Duration>) -> Self {
        self.response_time = response_time;
        self
    }
}

/// Terminal outcome of resolving one domain's reputation.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Success(LookupSuccess),
    Failure(LookupFailure),
}

impl LookupResult {
    pub fn cancelled(domain: Domain) -> Self {
        LookupResult::Failure(LookupFailure::cancelled(domain))
    }

    pub fn domain(&self) -> &Domain {
        match self {
            LookupResult::Success(s) => &s.domain,
            LookupResult::Failure(f) => &f.domain,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LookupResult::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        self.error_kind() == Some(LookupErrorKind::Cancelled)
    }

    pub fn is_cached(&self) -> bool {
        match self {
            LookupResult::Success(s) => s.cached,
            LookupResult::Failure(f) => f.cached,
        }
    }

    pub fn error_kind(&self) -> Option<LookupErrorKind> {
        match self {
            LookupResult::Success(_) => None,
            LookupResult::Failure(f) => Some(f.kind),
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            LookupResult::Success(s) => Some(s.classification),
            LookupResult::Failure(_) => None,
        }
    }

    pub fn response_time(&self) -> Option<Duration> {
        match self {
            LookupResult::Success(s) => Some(s.response_time),
            LookupResult::Failure(f) => f.response_time,
        }
    }

    /// Mark the result as served from cache.
    pub fn into_cached(self) -> Self {
        match self {
            LookupResult::Success(mut s) => {
                s.cached = true;
                LookupResult::Success(s)
            }
            LookupResult::Failure(mut f) => {
                f.cached = true;
                LookupResult::Failure(f)
            }
        }
    }
}

impl From<LookupSuccess> for LookupResult {
    fn from(success: LookupSuccess) -> Self {
        LookupResult::Success(success)
    }
}

impl From<LookupFailure> for LookupResult {
    fn from(failure: LookupFailure) -> Self {
        LookupResult::Failure(failure)
    }
}
