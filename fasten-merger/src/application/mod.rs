pub mod merge_usecase;

pub use merge_usecase::{merge, CancellationToken, MergeReport, NeverCancel};
