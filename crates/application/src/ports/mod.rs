pub mod domain_source;
pub mod report_writer;
pub mod reputation_service;

pub use domain_source::{DomainSource, Extraction};
pub use report_writer::ReportWriter;
pub use reputation_service::{ReputationPayload, ReputationService, ServiceError};
