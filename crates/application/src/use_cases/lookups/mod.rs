pub mod batch_lookup;

pub use batch_lookup::{
    BatchLookupUseCase, BatchOptions, BatchOutcome, BatchProgress, ProgressCallback,
};
