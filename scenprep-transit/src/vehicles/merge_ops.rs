use std::collections::HashSet;

use kdam::tqdm;
use scenprep_core::document::VehicleDefinitions;

use crate::TransitPrepError;

/// unions vehicle definitions by id. the first occurrence of a vehicle type
/// or vehicle wins.
pub fn merge_vehicle_definitions(documents: Vec<VehicleDefinitions>) -> VehicleDefinitions {
    let mut merged = VehicleDefinitions::default();
    let mut type_ids = HashSet::new();
    let mut vehicle_ids = HashSet::new();
    for document in documents.into_iter() {
        for vehicle_type in document.types.into_iter() {
            if type_ids.insert(vehicle_type.id.clone()) {
                merged.types.push(vehicle_type);
            } else {
                log::debug!("dropping duplicate vehicle type '{}'", vehicle_type.id);
            }
        }
        for vehicle in document.vehicles.into_iter() {
            if vehicle_ids.insert(vehicle.id.clone()) {
                merged.vehicles.push(vehicle);
            } else {
                log::debug!("dropping duplicate vehicle '{}'", vehicle.id);
            }
        }
    }
    merged
}

pub fn run(inputs: &[String], output_file: &str) -> Result<(), TransitPrepError> {
    if inputs.is_empty() {
        return Err(TransitPrepError::InvalidUserInput(String::from(
            "at least one vehicle definitions file is required",
        )));
    }
    let mut documents = vec![];
    for input in tqdm!(inputs.iter(), desc = "reading transit vehicles") {
        log::info!("reading transit vehicles file: {input}");
        documents.push(VehicleDefinitions::read(input)?);
    }
    eprintln!();
    let merged = merge_vehicle_definitions(documents);
    merged.write(output_file)?;
    log::info!(
        "merged {} vehicle types and {} vehicles into {output_file}",
        merged.types.len(),
        merged.vehicles.len()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use scenprep_core::document::{Vehicle, VehicleType};

    fn vehicle(id: &str, vehicle_type: &str) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            vehicle_type: vehicle_type.to_string(),
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut bus = VehicleType::new("Bus_veh_type");
        bus.seats = 40;
        let mut other_bus = VehicleType::new("Bus_veh_type");
        other_bus.seats = 10;
        let first = VehicleDefinitions {
            types: vec![bus],
            vehicles: vec![vehicle("v1", "Bus_veh_type")],
        };
        let second = VehicleDefinitions {
            types: vec![other_bus, VehicleType::new("RE_RB_veh_type")],
            vehicles: vec![vehicle("v1", "RE_RB_veh_type"), vehicle("v2", "RE_RB_veh_type")],
        };
        let merged = merge_vehicle_definitions(vec![first, second]);
        assert_eq!(merged.types.len(), 2);
        assert_eq!(merged.types[0].seats, 40);
        assert_eq!(merged.vehicles.len(), 2);
        assert_eq!(merged.vehicles[0].vehicle_type, "Bus_veh_type");
    }
}
