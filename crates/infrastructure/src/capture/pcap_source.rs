use super::packet::{dns_payload, is_supported_link_type};
use super::pcap::PcapReader;
use dns_reputation_application::ports::{DomainSource, Extraction};
use dns_reputation_domain::{CaptureStats, DomainError};
use hickory_proto::op::Message;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const PROGRESS_EVERY_PACKETS: u64 = 50;

/// Pulls every DNS question name out of a libpcap capture.
///
/// Queries and responses on UDP port 53 are decoded; each question name is
/// emitted as written on the wire, duplicates included. Undecodable DNS
/// payloads are counted as errors and skipped. A truncated file ends the
/// extraction with what was read so far.
pub struct PcapDomainSource {
    path: PathBuf,
}

impl PcapDomainSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DomainSource for PcapDomainSource {
    fn extract(&self, cancel: &CancellationToken) -> Result<Extraction, DomainError> {
        let file = File::open(&self.path).map_err(|e| {
            DomainError::IoError(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        let mut reader = PcapReader::new(BufReader::new(file))?;

        let link_type = reader.link_type();
        if !is_supported_link_type(link_type) {
            return Err(DomainError::UnsupportedLinkType(link_type));
        }

        info!(
            path = %self.path.display(),
            link_type,
            nanosecond = reader.is_nanosecond(),
            "Extracting domains from capture"
        );

        let mut stats = CaptureStats::default();
        let mut domains = Vec::new();
        let mut frame = Vec::with_capacity(2048);

        loop {
            if cancel.is_cancelled() {
                stats.interrupted = true;
                warn!(packets = stats.packets, "Capture extraction interrupted");
                break;
            }

            match reader.next_packet(&mut frame) {
                Ok(true) => {}
                Ok(false) => break,
                Err(DomainError::InvalidCapture(reason)) => {
                    stats.errors += 1;
                    warn!(reason = %reason, packets = stats.packets, "Capture ends with a damaged record");
                    break;
                }
                Err(e) => return Err(e),
            }

            stats.packets += 1;
            if stats.packets % PROGRESS_EVERY_PACKETS == 0 {
                debug!(
                    packets = stats.packets,
                    dns_messages = stats.dns_messages,
                    domains = stats.domains,
                    "Capture progress"
                );
            }

            let Some(payload) = dns_payload(link_type, &frame) else {
                continue;
            };

            match Message::from_vec(payload) {
                Ok(message) => {
                    stats.dns_messages += 1;
                    for query in message.queries() {
                        let name = query.name().to_utf8();
                        if name.is_empty() || name == "." {
                            continue;
                        }
                        stats.domains += 1;
                        domains.push(name);
                    }
                }
                Err(e) => {
                    stats.errors += 1;
                    debug!(packet = stats.packets, error = %e, "Skipping undecodable DNS payload");
                }
            }
        }

        info!(
            packets = stats.packets,
            dns_messages = stats.dns_messages,
            domains = stats.domains,
            errors = stats.errors,
            "Capture extraction finished"
        );

        Ok(Extraction { domains, stats })
    }

    fn describe(&self) -> String {
        format!("pcap:{}", self.path.display())
    }
}
