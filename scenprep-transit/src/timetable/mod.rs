//! derives per-trip timing offsets from a raw timetable export and
//! aggregates them into the tabular intermediates read by the schedule
//! builder.
mod aggregation;
mod raw_timetable;
mod station_master;
mod tables;
mod trip_record;

pub mod timetable_ops;

pub use aggregation::{aggregate_trips, mean_offsets};
pub use raw_timetable::{
    read_json, RawLineSummary, RawMaster, RawMasterEntry, RawMasterFile, RawSection, RawSummary,
    RawTimetable, RawTrain,
};
pub use station_master::StationMaster;
pub use tables::{parse_coordinate, stop_table, PipeSeparator, ScheduleRow, StopRow};
pub use trip_record::{
    arrival_offsets, departure_offsets, local_clock_time, waiting_times, TripRecord,
};
