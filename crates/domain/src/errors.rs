use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Malformed capture file: {0}")]
    InvalidCapture(String),

    #[error("Unsupported capture link type: {0}")]
    UnsupportedLinkType(u32),

    #[error("Report serialization failed: {0}")]
    Serialization(String),

    #[error("Operation cancelled")]
    Cancelled,
}
