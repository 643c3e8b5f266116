use std::collections::HashSet;

use scenprep_core::document::{
    Attribute, AttributeBag, Vehicle, VehicleDefinitions, VehicleType, JAVA_STRING,
};
use serde::{Deserialize, Serialize};

use crate::{util::csv_ops, TransitPrepError};

pub const DOOR_OPERATION_MODE_CLASS: &str = "org.matsim.vehicles.VehicleType$DoorOperationMode";

/// a row of the vehicle type table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTypeRow {
    pub vehicle_id: String,
    /// seconds per person
    pub access_time: f64,
    pub door_operation: String,
    /// seconds per person
    pub egress_time: f64,
    pub seats: u32,
    pub standing_room: u32,
    pub length: f64,
    pub width: f64,
    /// "true" in any letter case enables the engine information block
    pub engine_info: String,
}

/// a row of the vehicle count table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCountRow {
    pub operator: String,
    pub line_number: String,
    pub vehicle_count: u32,
    pub vehicle_type: String,
}

impl VehicleTypeRow {
    pub fn has_engine_info(&self) -> bool {
        self.engine_info.trim().eq_ignore_ascii_case("true")
    }
}

fn engine_attributes() -> AttributeBag {
    AttributeBag(vec![
        Attribute::new("HbefaEmissionsConcept", JAVA_STRING, "average"),
        Attribute::new("HbefaSizeClass", JAVA_STRING, "average"),
        Attribute::new("HbefaTechnology", JAVA_STRING, "average"),
        Attribute::new("HbefaVehicleCategory", JAVA_STRING, "NON_HBEFA_VEHICLE"),
    ])
}

impl From<&VehicleTypeRow> for VehicleType {
    fn from(row: &VehicleTypeRow) -> Self {
        let mut vehicle_type = VehicleType::new(&row.vehicle_id);
        vehicle_type.attributes = AttributeBag(vec![
            Attribute::double("accessTimeInSecondsPerPerson", row.access_time),
            Attribute::new(
                "doorOperationMode",
                DOOR_OPERATION_MODE_CLASS,
                &row.door_operation,
            ),
            Attribute::double("egressTimeInSecondsPerPerson", row.egress_time),
        ]);
        vehicle_type.seats = row.seats;
        vehicle_type.standing_room = row.standing_room;
        vehicle_type.length = row.length;
        vehicle_type.width = row.width;
        if row.has_engine_info() {
            vehicle_type.engine_attributes = Some(engine_attributes());
        }
        vehicle_type
    }
}

/// vehicles `pt_<operator>-<line>-<i>` for i in 0..count
pub fn vehicles_for_line(row: &VehicleCountRow) -> Vec<Vehicle> {
    (0..row.vehicle_count)
        .map(|i| Vehicle {
            id: format!("pt_{}-{}-{i}", row.operator, row.line_number),
            vehicle_type: row.vehicle_type.clone(),
        })
        .collect()
}

pub fn build_fleet(type_rows: &[VehicleTypeRow], count_rows: &[VehicleCountRow]) -> VehicleDefinitions {
    let types = type_rows.iter().map(VehicleType::from).collect::<Vec<_>>();
    let known: HashSet<&str> = types.iter().map(|t| t.id.as_str()).collect();
    let mut vehicles = vec![];
    for row in count_rows.iter() {
        if !known.contains(row.vehicle_type.as_str()) {
            log::warn!(
                "vehicles of {} line {} reference undefined vehicle type '{}'",
                row.operator,
                row.line_number,
                row.vehicle_type
            );
        }
        vehicles.extend(vehicles_for_line(row));
    }
    VehicleDefinitions { types, vehicles }
}

pub fn run(types_file: &str, counts_file: &str, output_file: &str) -> Result<(), TransitPrepError> {
    let type_rows: Vec<VehicleTypeRow> = csv_ops::read_rows(types_file)?;
    let count_rows: Vec<VehicleCountRow> = csv_ops::read_rows(counts_file)?;
    let fleet = build_fleet(&type_rows, &count_rows);
    fleet.write(output_file)?;
    log::info!(
        "wrote {} vehicle types and {} vehicles to {output_file}",
        fleet.types.len(),
        fleet.vehicles.len()
    );
    Ok(())
}
