//! Classic libpcap file reader (not pcapng).

use dns_reputation_domain::DomainError;
use std::io::{ErrorKind, Read};

const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
const MAGIC_NANOS: u32 = 0xa1b2_3c4d;

const GLOBAL_HEADER_LEN: usize = 24;
const RECORD_HEADER_LEN: usize = 16;

/// Records larger than this are treated as corruption whatever the snaplen says.
const MAX_RECORD_LEN: u32 = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        }
    }
}

/// True if `header` starts with a libpcap magic number in either byte order.
pub fn is_pcap_magic(header: &[u8]) -> bool {
    magic(header).is_some()
}

fn magic(header: &[u8]) -> Option<(Endian, bool)> {
    let bytes: [u8; 4] = header.get(..4)?.try_into().ok()?;
    let le = u32::from_le_bytes(bytes);
    let be = u32::from_be_bytes(bytes);
    match (le, be) {
        (MAGIC_MICROS, _) => Some((Endian::Little, false)),
        (MAGIC_NANOS, _) => Some((Endian::Little, true)),
        (_, MAGIC_MICROS) => Some((Endian::Big, false)),
        (_, MAGIC_NANOS) => Some((Endian::Big, true)),
        _ => None,
    }
}

/// Streaming reader over the records of a capture.
pub struct PcapReader<R> {
    inner: R,
    endian: Endian,
    nanosecond: bool,
    snaplen: u32,
    link_type: u32,
}

impl<R: Read> PcapReader<R> {
    /// Read and validate the global header.
    pub fn new(mut inner: R) -> Result<Self, DomainError> {
        let mut header = [0u8; GLOBAL_HEADER_LEN];
        inner.read_exact(&mut header).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => {
                DomainError::InvalidCapture("file is shorter than a pcap header".to_string())
            }
            _ => DomainError::IoError(e.to_string()),
        })?;

        let (endian, nanosecond) = magic(&header).ok_or_else(|| {
            DomainError::InvalidCapture("not a libpcap file (bad magic number)".to_string())
        })?;

        Ok(Self {
            inner,
            endian,
            nanosecond,
            snaplen: endian.u32(&header[16..20]),
            link_type: endian.u32(&header[20..24]),
        })
    }

    pub fn link_type(&self) -> u32 {
        self.link_type
    }

    pub fn is_nanosecond(&self) -> bool {
        self.nanosecond
    }

    /// Read the next record into `buf`. Returns `Ok(false)` at a clean end of file.
    pub fn next_packet(&mut self, buf: &mut Vec<u8>) -> Result<bool, DomainError> {
        let mut header = [0u8; RECORD_HEADER_LEN];
        match read_full(&mut self.inner, &mut header)? {
            0 => return Ok(false),
            RECORD_HEADER_LEN => {}
            n => {
                return Err(DomainError::InvalidCapture(format!(
                    "truncated record header ({} of {} bytes)",
                    n, RECORD_HEADER_LEN
                )))
            }
        }

        let captured = self.endian.u32(&header[8..12]);
        let limit = self.snaplen.max(u32::from(u16::MAX)).min(MAX_RECORD_LEN);
        if captured > limit {
            return Err(DomainError::InvalidCapture(format!(
                "record of {} bytes exceeds limit of {}",
                captured, limit
            )));
        }

        buf.resize(captured as usize, 0);
        let n = read_full(&mut self.inner, buf)?;
        if n < buf.len() {
            return Err(DomainError::InvalidCapture(format!(
                "truncated record ({} of {} bytes)",
                n,
                buf.len()
            )));
        }
        Ok(true)
    }
}

/// Like `read_exact`, but reports how much was read before EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, DomainError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DomainError::IoError(e.to_string())),
        }
    }
    Ok(filled)
}
