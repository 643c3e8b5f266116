use scenprep_core::{
    document::{Attribute, ScheduleWriteOptions, TransitSchedule, CRS_ATTRIBUTE},
    projection::{self, UtmProjection, UtmZone},
};

use crate::TransitPrepError;

/// decimal places of the projected (easting, northing) output
pub const PROJECTED_DECIMALS: (usize, usize) = (9, 8);
pub const GEOGRAPHIC_EPSG: &str = "EPSG:4326";

/// rewrites every stop coordinate of the schedule. the forward direction maps
/// WGS84 (lon, lat) into the zone; `inverse` maps zone coordinates back.
///
/// stops outside the geographic domain are projected anyway and counted,
/// unless `strict` is set, in which case the first one is an error. an
/// outside stop that cannot be transformed at all keeps its coordinate.
pub fn reproject_schedule(
    schedule: &mut TransitSchedule,
    projection: &UtmProjection,
    inverse: bool,
    strict: bool,
) -> Result<usize, TransitPrepError> {
    let mut out_of_range = 0;
    for stop in schedule.stops.iter_mut() {
        if inverse {
            stop.coord = projection.inverse(stop.coord)?;
            continue;
        }
        let within = projection::is_within_domain(stop.coord);
        if !within {
            if strict {
                return Err(TransitPrepError::OutOfRangeCoordinate {
                    stop_id: stop.id.clone(),
                    x: stop.coord.x,
                    y: stop.coord.y,
                });
            }
            log::warn!(
                "stop '{}' has coordinate ({}, {}) outside of the geographic domain",
                stop.id,
                stop.coord.x,
                stop.coord.y
            );
            out_of_range += 1;
        }
        match projection.forward(stop.coord) {
            Ok(coord) => stop.coord = coord,
            Err(e) if !within => log::warn!("stop '{}' keeps its coordinate: {e}", stop.id),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(out_of_range)
}

pub fn run(
    input_file: &str,
    output_file: &str,
    target_epsg: &str,
    inverse: bool,
    strict: bool,
    set_crs: bool,
) -> Result<(), TransitPrepError> {
    let projection = UtmZone::from_epsg(target_epsg)?.projection()?;
    let mut schedule = TransitSchedule::read(input_file)?;
    let out_of_range = reproject_schedule(&mut schedule, &projection, inverse, strict)?;
    let (options, crs) = if inverse {
        (ScheduleWriteOptions::default(), String::from(GEOGRAPHIC_EPSG))
    } else {
        let options = ScheduleWriteOptions {
            coordinate_decimals: Some(PROJECTED_DECIMALS),
        };
        (options, projection.zone().epsg_code())
    };
    if set_crs {
        schedule.attributes.set(Attribute::string(CRS_ATTRIBUTE, &crs));
    }
    schedule.write(output_file, &options)?;
    log::info!(
        "reprojected {} stops to {crs} ({out_of_range} outside of the valid domain), written to {output_file}",
        schedule.stops.len()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use geo::Coord;
    use scenprep_core::document::StopFacility;

    fn schedule_with(coords: &[(f64, f64)]) -> TransitSchedule {
        let mut schedule = TransitSchedule::default();
        for (i, (x, y)) in coords.iter().enumerate() {
            schedule
                .stops
                .push(StopFacility::new(&format!("s{i}"), Coord { x: *x, y: *y }));
        }
        schedule
    }

    fn zone() -> UtmProjection {
        UtmZone::from_epsg("EPSG:32653")
            .and_then(|z| z.projection())
            .expect("valid zone")
    }

    #[test]
    fn test_forward_then_inverse_restores_stops() {
        let original = schedule_with(&[(135.7588, 34.9858), (135.6780, 35.0394)]);
        let mut schedule = original.clone();
        reproject_schedule(&mut schedule, &zone(), false, true).expect("forward");
        assert!(schedule.stops[0].coord.x > 100_000.0);
        assert!(schedule.stops[0].coord.y > 3_000_000.0);
        reproject_schedule(&mut schedule, &zone(), true, true).expect("inverse");
        for (a, b) in original.stops.iter().zip(schedule.stops.iter()) {
            assert!((a.coord.x - b.coord.x).abs() < 1e-7);
            assert!((a.coord.y - b.coord.y).abs() < 1e-7);
        }
    }

    #[test]
    fn test_out_of_range_propagates_unless_strict() {
        let mut lenient = schedule_with(&[(135.7, 34.9), (135.7, 95.0)]);
        let count = reproject_schedule(&mut lenient, &zone(), false, false).expect("lenient");
        assert_eq!(count, 1);

        let mut strict = schedule_with(&[(135.7, 95.0)]);
        let result = reproject_schedule(&mut strict, &zone(), false, true);
        assert!(matches!(
            result,
            Err(TransitPrepError::OutOfRangeCoordinate { .. })
        ));
    }
}
