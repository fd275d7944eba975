use dns_reputation_domain::{BatchReport, DomainError, LookupResult};
use std::path::PathBuf;

/// Port for persisting the outcome of a batch run.
pub trait ReportWriter: Send + Sync {
    /// Persist `results` and `report`, returning where they were written.
    fn write(&self, results: &[LookupResult], report: &BatchReport) -> Result<PathBuf, DomainError>;

    fn format_name(&self) -> &'static str;
}
