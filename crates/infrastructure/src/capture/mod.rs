pub mod packet;
pub mod pcap;
pub mod pcap_source;
pub mod text_source;

pub use pcap_source::PcapDomainSource;
pub use text_source::TextDomainSource;

use dns_reputation_application::ports::DomainSource;
use dns_reputation_domain::config::InputFormat;
use dns_reputation_domain::DomainError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Resolve `Auto` by sniffing the first bytes of the file.
pub fn detect_format(path: &Path, format: InputFormat) -> Result<InputFormat, DomainError> {
    if format != InputFormat::Auto {
        return Ok(format);
    }

    let mut file = File::open(path)
        .map_err(|e| DomainError::IoError(format!("cannot open {}: {}", path.display(), e)))?;
    let mut magic = [0u8; 4];
    let n = file
        .read(&mut magic)
        .map_err(|e| DomainError::IoError(e.to_string()))?;

    Ok(if pcap::is_pcap_magic(&magic[..n]) {
        InputFormat::Pcap
    } else {
        InputFormat::Text
    })
}

/// Build the domain source matching `format` (after auto-detection).
pub fn open_source(path: &Path, format: InputFormat) -> Result<Arc<dyn DomainSource>, DomainError> {
    Ok(match detect_format(path, format)? {
        InputFormat::Pcap => Arc::new(PcapDomainSource::new(path)),
        InputFormat::Text | InputFormat::Auto => Arc::new(TextDomainSource::new(path)),
    })
}
