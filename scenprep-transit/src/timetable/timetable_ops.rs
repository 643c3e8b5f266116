use chrono::FixedOffset;
use rayon::prelude::*;

use super::{
    aggregate_trips,
    raw_timetable::{read_json, RawMasterFile, RawTimetable},
    stop_table, ScheduleRow, StationMaster, StopRow, TripRecord,
};
use crate::{util::csv_ops, TransitPrepError};

pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

pub fn utc_offset(hours: i32) -> Result<FixedOffset, TransitPrepError> {
    FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
        TransitPrepError::InvalidUserInput(format!("utc offset of {hours} hours is out of range"))
    })
}

/// derives one record per trip in parallel. input order is preserved and
/// trips without sections are dropped.
pub fn derive_trips(
    timetable: &RawTimetable,
    master: &StationMaster,
    offset: &FixedOffset,
) -> Result<Vec<TripRecord>, TransitPrepError> {
    let derived = timetable
        .trains
        .par_iter()
        .map(|train| TripRecord::from_raw(train, master, offset))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(derived.into_iter().flatten().collect())
}

/// builds the aggregated schedule table and the stop table.
pub fn extract_tables(
    timetable: &RawTimetable,
    master: &StationMaster,
    offset: &FixedOffset,
) -> Result<(Vec<ScheduleRow>, Vec<StopRow>), TransitPrepError> {
    let trips = derive_trips(timetable, master, offset)?;
    log::info!(
        "derived offsets for {} of {} trips",
        trips.len(),
        timetable.trains.len()
    );
    let rows = aggregate_trips(trips)?;
    let stops = stop_table(&rows, master)?;
    Ok((rows, stops))
}

pub fn run(
    timetable_file: &str,
    master_file: &str,
    schedule_output_file: &str,
    stop_output_file: &str,
    utc_offset_hours: i32,
) -> Result<(), TransitPrepError> {
    let offset = utc_offset(utc_offset_hours)?;
    let timetable: RawTimetable = read_json(timetable_file)?;
    let master = StationMaster::from(read_json::<RawMasterFile, _>(master_file)?);
    log::info!(
        "read {} trips and {} stations",
        timetable.trains.len(),
        master.station_count()
    );
    let (rows, stops) = extract_tables(&timetable, &master, &offset)?;
    csv_ops::write_rows(schedule_output_file, &rows)?;
    csv_ops::write_rows(stop_output_file, &stops)?;
    log::info!(
        "wrote {} stop sequences to {schedule_output_file} and {} stops to {stop_output_file}",
        rows.len(),
        stops.len()
    );
    Ok(())
}
