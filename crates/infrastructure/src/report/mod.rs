pub mod csv_writer;
pub mod json_writer;

pub use csv_writer::CsvReportWriter;
pub use json_writer::JsonReportWriter;

use dns_reputation_domain::{DomainError, LookupResult};
use serde::Serialize;
use std::path::Path;

/// Flat view of one result, shared by every output format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub domain: String,
    pub status: &'static str,
    pub reputation_score: Option<i64>,
    pub classification: Option<&'static str>,
    /// `;`-separated, sorted.
    pub categories: String,
    pub response_time_ms: Option<f64>,
    pub cached: bool,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub attempts: Option<u32>,
}

impl From<&LookupResult> for ResultRow {
    fn from(result: &LookupResult) -> Self {
        let response_time_ms = result
            .response_time()
            .map(|d| (d.as_secs_f64() * 1000.0 * 100.0).round() / 100.0);

        match result {
            LookupResult::Success(s) => ResultRow {
                domain: s.domain.to_string(),
                status: "success",
                reputation_score: Some(s.reputation_score),
                classification: Some(s.classification.as_str()),
                categories: s
                    .categories
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(";"),
                response_time_ms,
                cached: s.cached,
                error_kind: None,
                error_message: None,
                attempts: None,
            },
            LookupResult::Failure(f) => ResultRow {
                domain: f.domain.to_string(),
                status: "failure",
                reputation_score: None,
                classification: None,
                categories: String::new(),
                response_time_ms,
                cached: f.cached,
                error_kind: Some(f.kind.to_string()),
                error_message: f.last_error.as_ref().map(|e| e.message.clone()),
                attempts: Some(f.attempts),
            },
        }
    }
}

pub(crate) fn ensure_directory(dir: &Path) -> Result<(), DomainError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        DomainError::IoError(format!("cannot create {}: {}", dir.display(), e))
    })
}
