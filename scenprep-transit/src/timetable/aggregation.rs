use std::collections::BTreeMap;

use scenprep_core::time::ClockTime;

use super::{ScheduleRow, TripRecord};
use crate::TransitPrepError;

/// element-wise mean of equal-length offset sequences, truncated to whole
/// seconds.
pub fn mean_offsets(sequences: &[&[ClockTime]]) -> Result<Vec<ClockTime>, TransitPrepError> {
    let first = match sequences.first() {
        Some(first) => first,
        None => return Ok(vec![]),
    };
    if let Some(other) = sequences.iter().find(|s| s.len() != first.len()) {
        return Err(TransitPrepError::SchemaMismatch(format!(
            "cannot average offset sequences of length {} and {}",
            first.len(),
            other.len()
        )));
    }
    let n = sequences.len() as u64;
    let means = (0..first.len())
        .map(|i| {
            let total: u64 = sequences.iter().map(|s| s[i].seconds() as u64).sum();
            ClockTime((total / n) as u32)
        })
        .collect();
    Ok(means)
}

/// groups trips by their full stop sequence, groups ordered by sequence.
/// trip ids and first departures are collected in input order, descriptive
/// fields and waiting times come from the first trip, offsets are averaged.
pub fn aggregate_trips(trips: Vec<TripRecord>) -> Result<Vec<ScheduleRow>, TransitPrepError> {
    let mut groups: BTreeMap<Vec<String>, Vec<TripRecord>> = BTreeMap::new();
    for trip in trips.into_iter() {
        groups.entry(trip.stops.clone()).or_default().push(trip);
    }
    let mut rows = vec![];
    for (stops, members) in groups.into_iter() {
        let departure_offsets = mean_offsets(
            &members
                .iter()
                .map(|t| t.departure_offsets.as_slice())
                .collect::<Vec<_>>(),
        )
        .map_err(|e| with_group_context(e, &stops))?;
        let arrival_offsets = mean_offsets(
            &members
                .iter()
                .map(|t| t.arrival_offsets.as_slice())
                .collect::<Vec<_>>(),
        )
        .map_err(|e| with_group_context(e, &stops))?;
        let trip_ids = members.iter().map(|t| t.trip_id.clone()).collect();
        let departure_times = members
            .iter()
            .map(|t| t.departure_times.first().copied().unwrap_or_default())
            .collect();
        let first = match members.into_iter().next() {
            Some(first) => first,
            None => continue,
        };
        rows.push(ScheduleRow {
            stops,
            trip_ids,
            departure_times,
            coordinates: first.coordinates,
            start_station_name: first.start_station_name,
            end_station_name: first.end_station_name,
            route_type_id: first.route_type_id,
            route_type_name: first.route_type_name,
            first_route_name: first.first_route_name,
            last_route_name: first.last_route_name,
            departure_offsets,
            arrival_offsets,
            waiting_times: first.waiting_times,
        });
    }
    Ok(rows)
}

fn with_group_context(error: TransitPrepError, stops: &[String]) -> TransitPrepError {
    match error {
        TransitPrepError::SchemaMismatch(msg) => TransitPrepError::SchemaMismatch(format!(
            "{msg} in trips serving stop sequence [{}]",
            stops.join(", ")
        )),
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> ClockTime {
        ClockTime::from_hms(h, m, s)
    }

    fn trip(id: &str, stops: &[&str], first_departure: ClockTime, offsets: &[u32]) -> TripRecord {
        let offsets = offsets.iter().map(|s| ClockTime(*s)).collect::<Vec<_>>();
        TripRecord {
            trip_id: id.to_string(),
            route_type_id: String::from("1"),
            route_type_name: format!("type of {id}"),
            first_route_name: String::from("本線"),
            last_route_name: String::from("本線"),
            stops: stops.iter().map(|s| s.to_string()).collect(),
            coordinates: stops.iter().map(|_| format!("{id},0")).collect(),
            start_station_name: String::new(),
            end_station_name: String::new(),
            departure_times: vec![first_departure],
            arrival_times: vec![],
            departure_offsets: offsets.clone(),
            arrival_offsets: offsets,
            waiting_times: vec![],
        }
    }

    #[test]
    fn test_mean_truncates() {
        let a: &[ClockTime] = &[ClockTime(0), ClockTime(601)];
        let b: &[ClockTime] = &[ClockTime(0), ClockTime(600)];
        let mean = mean_offsets(&[a, b]).expect("equal lengths");
        assert_eq!(mean, vec![ClockTime(0), ClockTime(600)]);
    }

    #[test]
    fn test_mean_length_mismatch_is_error() {
        let a: &[ClockTime] = &[ClockTime(0), ClockTime(600)];
        let b: &[ClockTime] = &[ClockTime(0)];
        assert!(matches!(
            mean_offsets(&[a, b]),
            Err(TransitPrepError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_group_by_stop_sequence() {
        let trips = vec![
            trip("T2", &["B", "C"], hms(9, 0, 0), &[0, 300]),
            trip("T1", &["A", "B"], hms(8, 0, 0), &[0, 600]),
            trip("T3", &["A", "B"], hms(8, 30, 0), &[0, 660]),
        ];
        let rows = aggregate_trips(trips).expect("aggregation succeeds");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stops, vec!["A", "B"]);
        assert_eq!(rows[0].trip_ids, vec!["T1", "T3"]);
        assert_eq!(rows[0].departure_times, vec![hms(8, 0, 0), hms(8, 30, 0)]);
        assert_eq!(rows[0].route_type_name, "type of T1");
        assert_eq!(rows[0].coordinates, vec!["T1,0", "T1,0"]);
        assert_eq!(rows[0].departure_offsets, vec![ClockTime(0), ClockTime(630)]);
        assert_eq!(rows[0].departure_offsets.len(), 2);
        assert_eq!(rows[1].trip_ids, vec!["T2"]);
    }
}
