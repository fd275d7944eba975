use crate::ports::ReportWriter;
use dns_reputation_domain::{BatchReport, LookupResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Hands the final results to every configured writer.
///
/// A failing writer is logged and skipped; the others still run.
pub struct PublishReportUseCase {
    writers: Vec<Arc<dyn ReportWriter>>,
}

impl PublishReportUseCase {
    pub fn new(writers: Vec<Arc<dyn ReportWriter>>) -> Self {
        Self { writers }
    }

    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    /// Returns the paths that were written successfully.
    #[instrument(skip_all, fields(writers = self.writers.len()))]
    pub fn execute(&self, results: &[LookupResult], report: &BatchReport) -> Vec<PathBuf> {
        let mut written = Vec::with_capacity(self.writers.len());

        for writer in &self.writers {
            match writer.write(results, report) {
                Ok(path) => {
                    info!(
                        format = writer.format_name(),
                        path = %path.display(),
                        rows = results.len(),
                        "Report written"
                    );
                    written.push(path);
                }
                Err(e) => {
                    error!(format = writer.format_name(), error = %e, "Failed to write report");
                }
            }
        }

        written
    }
}
