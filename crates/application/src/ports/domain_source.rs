use dns_reputation_domain::{CaptureStats, DomainError};
use tokio_util::sync::CancellationToken;

/// Raw domain names pulled from a source, duplicates and casing untouched.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub domains: Vec<String>,
    pub stats: CaptureStats,
}

/// Port for anything that yields domain names to analyze.
///
/// Extraction is sequential, blocking I/O; callers on the async runtime run
/// it through `spawn_blocking`. Implementations check `cancel` between
/// records and return what they collected so far once it fires.
pub trait DomainSource: Send + Sync {
    fn extract(&self, cancel: &CancellationToken) -> Result<Extraction, DomainError>;

    fn describe(&self) -> String;
}
