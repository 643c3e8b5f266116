use std::collections::BTreeMap;

use geo::Coord;
use itertools::Itertools;
use scenprep_core::{
    document::{
        Attribute, AttributeBag, Departure, RouteProfileStop, ScheduleWriteOptions, StopFacility,
        TransitLine, TransitRoute, TransitSchedule, CRS_ATTRIBUTE,
    },
    time::ClockTime,
};

use crate::{
    timetable::{ScheduleRow, StopRow},
    util::csv_ops,
    TransitPrepError,
};

pub const DEFAULT_TRANSPORT_MODE: &str = "train";

/// network link id used for a stop facility
pub fn stop_link_id(stop_id: &str) -> String {
    format!("pt_{stop_id}")
}

pub fn stop_facility(row: &StopRow) -> StopFacility {
    let mut stop = StopFacility::new(&row.stop_id, Coord { x: row.x, y: row.y });
    stop.name = Some(row.name.clone());
    stop.link_ref_id = Some(stop_link_id(&row.stop_id));
    stop.is_blocking = Some(false);
    stop
}

/// route profile from a stop sequence and its offsets: the first stop
/// departs at the first departure offset, middle stops arrive at the
/// preceding section's arrival offset, and the last stop arrives and
/// departs at the final arrival offset.
pub fn route_profile(row: &ScheduleRow) -> Result<Vec<RouteProfileStop>, TransitPrepError> {
    let n = row.stops.len();
    if n < 2 || row.arrival_offsets.len() != n - 1 || row.departure_offsets.len() != n - 1 {
        return Err(TransitPrepError::SchemaMismatch(format!(
            "stop sequence [{}] has {n} stops, {} departure offsets and {} arrival offsets",
            row.stops.join(", "),
            row.departure_offsets.len(),
            row.arrival_offsets.len()
        )));
    }
    let profile_stop = |ref_id: &str, arrival: ClockTime, departure: ClockTime| {
        let mut stop = RouteProfileStop::new(ref_id);
        stop.arrival_offset = Some(arrival);
        stop.departure_offset = Some(departure);
        stop.await_departure = Some(true);
        stop
    };
    let last_arrival = row.arrival_offsets[n - 2];
    let profile = row
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| match i {
            0 => profile_stop(stop.as_str(), ClockTime::ZERO, row.departure_offsets[0]),
            i if i == n - 1 => profile_stop(stop.as_str(), last_arrival, last_arrival),
            i => profile_stop(
                stop.as_str(),
                row.arrival_offsets[i - 1],
                row.departure_offsets[i],
            ),
        })
        .collect();
    Ok(profile)
}

/// builds a schedule document from the stop table and the aggregated
/// schedule table. one line per (first route name, last route name) pair,
/// routes numbered from 1 within their line in table order.
pub fn build_schedule(
    stop_rows: &[StopRow],
    schedule_rows: &[ScheduleRow],
    transport_mode: &str,
) -> Result<TransitSchedule, TransitPrepError> {
    let stops = stop_rows.iter().map(stop_facility).collect_vec();

    let mut grouped: BTreeMap<(&str, &str), Vec<&ScheduleRow>> = BTreeMap::new();
    for row in schedule_rows.iter() {
        grouped
            .entry((row.first_route_name.as_str(), row.last_route_name.as_str()))
            .or_default()
            .push(row);
    }

    let mut lines = vec![];
    for ((first, last), rows) in grouped.into_iter() {
        let line_id = format!("{first}_{last}");
        let mut routes = vec![];
        for (route_num, row) in (1..).zip(rows.into_iter()) {
            if row.trip_ids.len() != row.departure_times.len() {
                return Err(TransitPrepError::SchemaMismatch(format!(
                    "line '{line_id}' route {route_num} has {} trips but {} departure times",
                    row.trip_ids.len(),
                    row.departure_times.len()
                )));
            }
            let mut route = TransitRoute::new(&format!(
                "{line_id}_{route_num}_{}",
                row.route_type_name
            ));
            route.transport_mode = Some(transport_mode.to_string());
            route.profile = route_profile(row)?;
            route.links = row.stops.iter().map(|s| stop_link_id(s)).collect();
            route.departures = row
                .trip_ids
                .iter()
                .zip(row.departure_times.iter())
                .map(|(trip_id, time)| Departure {
                    id: trip_id.clone(),
                    departure_time: *time,
                    vehicle_ref_id: Some(format!("pt_{line_id}_{route_num}_{trip_id}")),
                })
                .collect();
            routes.push(route);
        }
        lines.push(TransitLine {
            id: line_id,
            name: None,
            attributes: AttributeBag::default(),
            routes,
        });
    }
    Ok(TransitSchedule {
        stops,
        lines,
        ..Default::default()
    })
}

pub fn run(
    stop_file: &str,
    schedule_file: &str,
    output_file: &str,
    transport_mode: &str,
    crs: Option<&str>,
) -> Result<(), TransitPrepError> {
    let stop_rows: Vec<StopRow> = csv_ops::read_rows(stop_file)?;
    let schedule_rows: Vec<ScheduleRow> = csv_ops::read_rows(schedule_file)?;
    let mut schedule = build_schedule(&stop_rows, &schedule_rows, transport_mode)?;
    if let Some(crs) = crs {
        schedule.attributes.set(Attribute::string(CRS_ATTRIBUTE, crs));
    }
    schedule.write(output_file, &ScheduleWriteOptions::default())?;
    let route_count: usize = schedule.lines.iter().map(|l| l.routes.len()).sum();
    log::info!(
        "built schedule with {} stops, {} lines and {route_count} routes, written to {output_file}",
        schedule.stops.len(),
        schedule.lines.len()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> ClockTime {
        ClockTime::from_hms(h, m, s)
    }

    fn row(first: &str, last: &str, stops: &[&str], trips: &[&str]) -> ScheduleRow {
        let n = stops.len();
        ScheduleRow {
            stops: stops.iter().map(|s| s.to_string()).collect(),
            trip_ids: trips.iter().map(|s| s.to_string()).collect(),
            departure_times: trips.iter().map(|_| hms(8, 0, 0)).collect(),
            coordinates: stops.iter().map(|_| String::from("0,0")).collect(),
            start_station_name: String::new(),
            end_station_name: String::new(),
            route_type_id: String::from("1"),
            route_type_name: String::from("普通"),
            first_route_name: first.to_string(),
            last_route_name: last.to_string(),
            departure_offsets: (0..n - 1).map(|i| ClockTime(i as u32 * 600)).collect(),
            arrival_offsets: (0..n - 1).map(|i| ClockTime(i as u32 * 600 + 300)).collect(),
            waiting_times: vec![],
        }
    }

    #[test]
    fn test_route_profile_offsets() {
        let profile = route_profile(&row("a", "a", &["S1", "S2", "S3"], &["T1"]))
            .expect("consistent row");
        let offsets = profile
            .iter()
            .map(|s| {
                (
                    s.ref_id.as_str(),
                    s.arrival_offset.map(|t| t.to_string()),
                    s.departure_offset.map(|t| t.to_string()),
                )
            })
            .collect::<Vec<_>>();
        let some = |s: &str| Some(s.to_string());
        assert_eq!(
            offsets,
            vec![
                ("S1", some("00:00:00"), some("00:00:00")),
                ("S2", some("00:05:00"), some("00:10:00")),
                ("S3", some("00:15:00"), some("00:15:00")),
            ]
        );
        assert!(profile.iter().all(|s| s.await_departure == Some(true)));
    }

    #[test]
    fn test_inconsistent_row_is_schema_error() {
        let mut bad = row("a", "a", &["S1", "S2", "S3"], &["T1"]);
        bad.arrival_offsets.pop();
        assert!(matches!(
            route_profile(&bad),
            Err(TransitPrepError::SchemaMismatch(_))
        ));

        let mut extra = row("a", "a", &["S1", "S2", "S3"], &["T1"]);
        extra.departure_offsets.push(ClockTime(1800));
        assert!(matches!(
            route_profile(&extra),
            Err(TransitPrepError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_build_schedule_lines_and_ids() {
        let stops = vec![
            StopRow {
                stop_id: String::from("S1"),
                x: 135.1,
                y: 35.0,
                name: String::from("京都"),
            },
            StopRow {
                stop_id: String::from("S2"),
                x: 135.2,
                y: 35.1,
                name: String::from("山科"),
            },
        ];
        let rows = vec![
            row("本線", "支線", &["S1", "S2"], &["T1", "T2"]),
            row("京都線", "京都線", &["S2", "S1"], &["T3"]),
            row("本線", "支線", &["S1", "S2", "S1"], &["T4"]),
        ];
        let schedule = build_schedule(&stops, &rows, DEFAULT_TRANSPORT_MODE).expect("build");
        assert_eq!(schedule.stops[0].link_ref_id.as_deref(), Some("pt_S1"));
        assert_eq!(schedule.stops[0].is_blocking, Some(false));
        let line_ids = schedule.lines.iter().map(|l| l.id.as_str()).collect::<Vec<_>>();
        assert_eq!(line_ids, vec!["京都線_京都線", "本線_支線"]);
        let main = &schedule.lines[1];
        let route_ids = main.routes.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();
        assert_eq!(route_ids, vec!["本線_支線_1_普通", "本線_支線_2_普通"]);
        let first_route = &main.routes[0];
        assert_eq!(first_route.transport_mode.as_deref(), Some("train"));
        assert_eq!(first_route.links, vec!["pt_S1", "pt_S2"]);
        assert_eq!(first_route.departures[1].id, "T2");
        assert_eq!(
            first_route.departures[1].vehicle_ref_id.as_deref(),
            Some("pt_本線_支線_1_T2")
        );
    }
}
