use scenprep_core::document::{ScheduleWriteOptions, TransitSchedule, Vehicle, VehicleDefinitions};

use super::ModeMapping;
use crate::TransitPrepError;

/// counts of an assignment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentSummary {
    pub named_departures: usize,
    pub created_vehicles: usize,
}

/// gives every departure a vehicle of the type mapped from its route's
/// transport mode. departures without a vehicle reference get
/// `<line>_<route>_<departure>`, and vehicles missing from the definitions
/// are created.
pub fn assign_vehicles(
    schedule: &mut TransitSchedule,
    vehicles: &mut VehicleDefinitions,
    mapping: &ModeMapping,
) -> Result<AssignmentSummary, TransitPrepError> {
    let mut summary = AssignmentSummary::default();
    for line in schedule.lines.iter_mut() {
        for route in line.routes.iter_mut() {
            let mode = route.transport_mode.as_deref().unwrap_or_default();
            let type_id = mapping.vehicle_type(mode).ok_or_else(|| {
                TransitPrepError::InvalidUserInput(format!(
                    "no vehicle type mapping found for transport mode '{mode}' of route '{}'",
                    route.id
                ))
            })?;
            if vehicles.vehicle_type(type_id).is_none() {
                return Err(TransitPrepError::UnresolvableReference(format!(
                    "vehicle type '{type_id}' not found"
                )));
            }
            for departure in route.departures.iter_mut() {
                let vehicle_id = match &departure.vehicle_ref_id {
                    Some(id) => id.clone(),
                    None => {
                        let id = format!("{}_{}_{}", line.id, route.id, departure.id);
                        departure.vehicle_ref_id = Some(id.clone());
                        summary.named_departures += 1;
                        id
                    }
                };
                if !vehicles.has_vehicle(&vehicle_id) {
                    vehicles.vehicles.push(Vehicle {
                        id: vehicle_id,
                        vehicle_type: type_id.to_string(),
                    });
                    summary.created_vehicles += 1;
                }
            }
        }
    }
    Ok(summary)
}

pub fn run(
    schedule_file: &str,
    vehicles_file: &str,
    output_schedule_file: &str,
    output_vehicles_file: &str,
    mapping: &ModeMapping,
) -> Result<(), TransitPrepError> {
    let mut schedule = TransitSchedule::read(schedule_file)?;
    let mut vehicles = VehicleDefinitions::read(vehicles_file)?;
    let summary = assign_vehicles(&mut schedule, &mut vehicles, mapping)?;
    vehicles.write(output_vehicles_file)?;
    schedule.write(output_schedule_file, &ScheduleWriteOptions::default())?;
    log::info!(
        "assigned vehicle ids to {} departures and created {} vehicles",
        summary.named_departures,
        summary.created_vehicles
    );
    Ok(())
}
