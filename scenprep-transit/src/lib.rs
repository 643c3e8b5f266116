//! transit scenario preparation: schedule merge, reprojection and patching,
//! timetable offset extraction, schedule document building, and transit
//! vehicle fleets.
pub mod app;
pub mod schedule;
pub mod timetable;
pub mod util;
pub mod vehicles;

mod error;

pub use error::TransitPrepError;
