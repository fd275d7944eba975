use super::{ensure_directory, ResultRow};
use chrono::{SecondsFormat, Utc};
use dns_reputation_application::ports::ReportWriter;
use dns_reputation_domain::{BatchReport, DomainError, LookupResult};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub const JSON_FILE_NAME: &str = "results.json";

#[derive(Serialize)]
struct JsonDocument<'a> {
    generated_at: String,
    source: Option<&'a str>,
    summary: &'a BatchReport,
    results: Vec<ResultRow>,
}

/// Writes the summary and every result to `<directory>/results.json`.
pub struct JsonReportWriter {
    directory: PathBuf,
    source: Option<String>,
}

impl JsonReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            source: None,
        }
    }

    /// Record where the domains came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl ReportWriter for JsonReportWriter {
    fn write(&self, results: &[LookupResult], report: &BatchReport) -> Result<PathBuf, DomainError> {
        ensure_directory(&self.directory)?;
        let path = self.directory.join(JSON_FILE_NAME);

        let document = JsonDocument {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source: self.source.as_deref(),
            summary: report,
            results: results.iter().map(ResultRow::from).collect(),
        };

        let file = File::create(&path).map_err(|e| {
            DomainError::IoError(format!("cannot create {}: {}", path.display(), e))
        })?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, &document)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;
        out.write_all(b"\n")
            .and_then(|_| out.flush())
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        Ok(path)
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}
