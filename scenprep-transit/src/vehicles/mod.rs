mod mode_mapping;

pub mod assign_ops;
pub mod fleet_ops;
pub mod merge_ops;

pub use mode_mapping::{ModeMapping, DEFAULT_MODE_MAPPING};
