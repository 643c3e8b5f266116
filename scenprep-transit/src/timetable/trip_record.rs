use chrono::{DateTime, FixedOffset, Timelike};
use scenprep_core::time::{elapsed_with_rollover, ClockTime};

use super::{raw_timetable::RawTrain, StationMaster};
use crate::TransitPrepError;

/// per-trip row derived from the raw export, before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub trip_id: String,
    pub route_type_id: String,
    pub route_type_name: String,
    pub first_route_name: String,
    pub last_route_name: String,
    pub stops: Vec<String>,
    /// "x,y" tokens, one per stop
    pub coordinates: Vec<String>,
    pub start_station_name: String,
    pub end_station_name: String,
    pub departure_times: Vec<ClockTime>,
    pub arrival_times: Vec<ClockTime>,
    pub departure_offsets: Vec<ClockTime>,
    pub arrival_offsets: Vec<ClockTime>,
    pub waiting_times: Vec<ClockTime>,
}

/// local clock time of a unix timestamp in the given UTC offset.
pub fn local_clock_time(timestamp: f64, offset: &FixedOffset) -> Result<ClockTime, TransitPrepError> {
    let instant = DateTime::from_timestamp(timestamp.floor() as i64, 0).ok_or_else(|| {
        TransitPrepError::SchemaMismatch(format!("timestamp {timestamp} is out of range"))
    })?;
    let local = instant.with_timezone(offset).time();
    Ok(ClockTime(local.num_seconds_from_midnight()))
}

/// zero for the first section, then the elapsed time from the first departure
/// to each later departure.
pub fn departure_offsets(departures: &[ClockTime]) -> Vec<ClockTime> {
    match departures.first() {
        None => vec![],
        Some(first) => std::iter::once(ClockTime::ZERO)
            .chain(
                departures
                    .iter()
                    .skip(1)
                    .map(|dep| elapsed_with_rollover(*first, *dep)),
            )
            .collect(),
    }
}

/// elapsed time from the first departure to every section arrival.
pub fn arrival_offsets(departures: &[ClockTime], arrivals: &[ClockTime]) -> Vec<ClockTime> {
    match departures.first() {
        None => vec![],
        Some(first) => arrivals
            .iter()
            .map(|arr| elapsed_with_rollover(*first, *arr))
            .collect(),
    }
}

/// gap between each section's arrival and the next section's departure.
pub fn waiting_times(departures: &[ClockTime], arrivals: &[ClockTime]) -> Vec<ClockTime> {
    arrivals
        .iter()
        .zip(departures.iter().skip(1))
        .map(|(arr, dep)| elapsed_with_rollover(*arr, *dep))
        .collect()
}

impl TripRecord {
    /// derives the trip row. trips without sections produce None.
    pub fn from_raw(
        train: &RawTrain,
        master: &StationMaster,
        offset: &FixedOffset,
    ) -> Result<Option<TripRecord>, TransitPrepError> {
        let (first, last) = match (train.sections.first(), train.sections.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                log::debug!("skipping trip '{}' without sections", train.summary.tid);
                return Ok(None);
            }
        };
        let route_type_id = train
            .summary
            .ls
            .last()
            .map(|l| l.tt.clone())
            .unwrap_or_default();
        let departure_times = train
            .sections
            .iter()
            .map(|s| local_clock_time(s.fts, offset))
            .collect::<Result<Vec<_>, _>>()?;
        let arrival_times = train
            .sections
            .iter()
            .map(|s| local_clock_time(s.tts, offset))
            .collect::<Result<Vec<_>, _>>()?;

        let mut stops = train.sections.iter().map(|s| s.f.clone()).collect::<Vec<_>>();
        stops.push(last.t.clone());

        let mut coordinates = vec![];
        for section in train.sections.iter() {
            let mut tokens = section.s.split_whitespace();
            if let Some(token) = tokens.next() {
                coordinates.push(token.to_string());
            }
        }
        if let Some(token) = last.s.split_whitespace().last() {
            coordinates.push(token.to_string());
        }

        let name_of = |code: &str| master.station_name(code).unwrap_or_default().to_string();
        Ok(Some(TripRecord {
            trip_id: train.summary.tid.clone(),
            route_type_name: master
                .route_type_name(&route_type_id)
                .unwrap_or_default()
                .to_string(),
            route_type_id,
            first_route_name: first.rn.clone(),
            last_route_name: last.rn.clone(),
            start_station_name: name_of(&first.f),
            end_station_name: name_of(&last.t),
            stops,
            coordinates,
            departure_offsets: departure_offsets(&departure_times),
            arrival_offsets: arrival_offsets(&departure_times, &arrival_times),
            waiting_times: waiting_times(&departure_times, &arrival_times),
            departure_times,
            arrival_times,
        }))
    }
}
