mod duplicate_stop_policy;
mod merge_context;

pub mod build_ops;
pub mod merge_ops;
pub mod patch_ops;
pub mod reproject_ops;
pub mod validation;

pub use duplicate_stop_policy::DuplicateStopPolicy;
pub use merge_context::{MergeSummary, ScheduleMergeContext};
pub use validation::{validate_schedule, IssueSeverity, ValidationIssue};
