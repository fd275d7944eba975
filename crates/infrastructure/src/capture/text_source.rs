use dns_reputation_application::ports::{DomainSource, Extraction};
use dns_reputation_domain::{CaptureStats, DomainError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Domain list file: one name per line, `#` starts a comment.
pub struct TextDomainSource {
    path: PathBuf,
}

impl TextDomainSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DomainSource for TextDomainSource {
    fn extract(&self, cancel: &CancellationToken) -> Result<Extraction, DomainError> {
        let file = File::open(&self.path).map_err(|e| {
            DomainError::IoError(format!("cannot open {}: {}", self.path.display(), e))
        })?;

        let mut stats = CaptureStats::default();
        let mut domains = Vec::new();

        for line in BufReader::new(file).split(b'\n') {
            if cancel.is_cancelled() {
                stats.interrupted = true;
                break;
            }
            let line = line.map_err(|e| DomainError::IoError(e.to_string()))?;
            let line = String::from_utf8_lossy(&line);
            let entry = line.split('#').next().unwrap_or_default().trim();
            if entry.is_empty() {
                continue;
            }
            stats.domains += 1;
            domains.push(entry.to_string());
        }

        info!(
            path = %self.path.display(),
            domains = stats.domains,
            "Domain list loaded"
        );

        Ok(Extraction { domains, stats })
    }

    fn describe(&self) -> String {
        format!("text:{}", self.path.display())
    }
}
