use super::{ensure_directory, ResultRow};
use dns_reputation_application::ports::ReportWriter;
use dns_reputation_domain::{BatchReport, DomainError, LookupResult};
use std::path::PathBuf;

pub const CSV_FILE_NAME: &str = "results.csv";

/// Writes one row per domain to `<directory>/results.csv`.
pub struct CsvReportWriter {
    directory: PathBuf,
}

impl CsvReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(&self, results: &[LookupResult], _report: &BatchReport) -> Result<PathBuf, DomainError> {
        ensure_directory(&self.directory)?;
        let path = self.directory.join(CSV_FILE_NAME);

        let mut writer = csv::Writer::from_path(&path).map_err(|e| {
            DomainError::IoError(format!("cannot create {}: {}", path.display(), e))
        })?;
        for result in results {
            writer
                .serialize(ResultRow::from(result))
                .map_err(|e| DomainError::Serialization(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        Ok(path)
    }

    fn format_name(&self) -> &'static str {
        "csv"
    }
}
