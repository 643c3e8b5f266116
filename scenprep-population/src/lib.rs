//! synthetic tourist population generation for transit simulation scenarios,
//! plus commuter flows from activity tables.
pub mod app;
pub mod commuter;
pub mod config;
pub mod generator;
pub mod poi;
pub mod sampling;

mod error;

pub use error::PopulationError;
