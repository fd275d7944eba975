pub mod lookups;
pub mod reports;

// Re-export use cases
pub use lookups::{BatchLookupUseCase, BatchOptions, BatchOutcome, BatchProgress, ProgressCallback};
pub use reports::{BuildReportUseCase, PublishReportUseCase};
