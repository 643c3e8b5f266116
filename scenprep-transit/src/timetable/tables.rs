use std::collections::HashSet;

use geo::Coord;
use scenprep_core::time::ClockTime;
use serde::{Deserialize, Serialize};
use serde_with::{formats::Separator, serde_as, StringWithSeparator};

use super::StationMaster;
use crate::TransitPrepError;

/// list-valued CSV cells are written as `a|b|c`.
pub struct PipeSeparator;

impl Separator for PipeSeparator {
    fn separator() -> &'static str {
        "|"
    }
}

/// one row per distinct stop sequence, aggregated over the trips serving it.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, String>")]
    pub stops: Vec<String>,
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, String>")]
    pub trip_ids: Vec<String>,
    /// first departure clock time of each trip, aligned with `trip_ids`
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, ClockTime>")]
    pub departure_times: Vec<ClockTime>,
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, String>")]
    pub coordinates: Vec<String>,
    pub start_station_name: String,
    pub end_station_name: String,
    pub route_type_id: String,
    pub route_type_name: String,
    pub first_route_name: String,
    pub last_route_name: String,
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, ClockTime>")]
    pub departure_offsets: Vec<ClockTime>,
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, ClockTime>")]
    pub arrival_offsets: Vec<ClockTime>,
    #[serde_as(as = "StringWithSeparator::<PipeSeparator, ClockTime>")]
    pub waiting_times: Vec<ClockTime>,
}

/// a stop facility candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRow {
    pub stop_id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub name: String,
}

/// parses an "x,y" coordinate token.
pub fn parse_coordinate(token: &str) -> Result<Coord<f64>, TransitPrepError> {
    let invalid = || TransitPrepError::SchemaMismatch(format!("invalid coordinate token '{token}'"));
    let (x, y) = token.split_once(',').ok_or_else(invalid)?;
    Ok(Coord {
        x: x.trim().parse::<f64>().map_err(|_| invalid())?,
        y: y.trim().parse::<f64>().map_err(|_| invalid())?,
    })
}

/// builds the stop table from aggregated schedule rows.
///
/// within a row, a stop id that repeats keeps its first position but takes
/// the coordinate of its last occurrence. across rows, identical
/// (id, coordinate) pairs are emitted once in first-seen order.
pub fn stop_table(
    rows: &[ScheduleRow],
    master: &StationMaster,
) -> Result<Vec<StopRow>, TransitPrepError> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut result = vec![];
    for row in rows.iter() {
        if row.stops.len() != row.coordinates.len() {
            log::warn!(
                "stop sequence starting at '{}' has {} stops but {} coordinates, unmatched stops are dropped",
                row.stops.first().map(String::as_str).unwrap_or_default(),
                row.stops.len(),
                row.coordinates.len()
            );
        }
        let mut row_pairs: Vec<(&str, &str)> = vec![];
        for (stop, coord) in row.stops.iter().zip(row.coordinates.iter()) {
            let existing = row_pairs.iter().position(|(id, _)| *id == stop.as_str());
            match existing {
                Some(index) => row_pairs[index].1 = coord.as_str(),
                None => row_pairs.push((stop.as_str(), coord.as_str())),
            }
        }
        for (stop, coord) in row_pairs.into_iter() {
            if !seen.insert((stop.to_string(), coord.to_string())) {
                continue;
            }
            let position = parse_coordinate(coord)?;
            result.push(StopRow {
                stop_id: stop.to_string(),
                x: position.x,
                y: position.y,
                name: master.station_name(stop).unwrap_or_default().to_string(),
            });
        }
    }
    Ok(result)
}
