pub mod build_report;
pub mod publish_report;

pub use build_report::BuildReportUseCase;
pub use publish_report::PublishReportUseCase;
