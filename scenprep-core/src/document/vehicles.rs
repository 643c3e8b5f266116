use std::{io::Write, path::Path};

use roxmltree::Node;

use super::{write_document, xml_read_ops as xr, AttributeBag, XmlWriter};
use crate::{util::fs, DocumentError};

pub const VEHICLES_NAMESPACE: &str = "http://www.matsim.org/files/dtd";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const VEHICLES_SCHEMA_LOCATION: &str =
    "http://www.matsim.org/files/dtd http://www.matsim.org/files/dtd/vehicleDefinitions_v2.0.xsd";

/// a vehicle definitions document (v2): vehicle types followed by vehicles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleDefinitions {
    pub types: Vec<VehicleType>,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleType {
    pub id: String,
    pub description: Option<String>,
    pub attributes: AttributeBag,
    pub seats: u32,
    pub standing_room: u32,
    /// meters
    pub length: f64,
    /// meters
    pub width: f64,
    /// attributes of the `<engineInformation>` block, when one is present
    pub engine_attributes: Option<AttributeBag>,
    pub pce: f64,
    pub network_mode: String,
    pub flow_efficiency_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: String,
    pub vehicle_type: String,
}

impl VehicleType {
    /// a vehicle type with the defaults used for scheduled transit vehicles.
    pub fn new(id: &str) -> VehicleType {
        VehicleType {
            id: id.to_string(),
            description: None,
            attributes: AttributeBag::default(),
            seats: 1,
            standing_room: 0,
            length: 7.5,
            width: 1.0,
            engine_attributes: None,
            pce: 1.0,
            network_mode: String::from("car"),
            flow_efficiency_factor: 1.0,
        }
    }
}

impl VehicleDefinitions {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<VehicleDefinitions, DocumentError> {
        let contents = fs::read_to_string(path.as_ref())?;
        VehicleDefinitions::from_xml_str(&contents).map_err(|e| DocumentError::ReadError {
            path: path.as_ref().to_owned(),
            message: e.to_string(),
        })
    }

    pub fn from_xml_str(xml: &str) -> Result<VehicleDefinitions, DocumentError> {
        let doc = xr::parse_document(xml)?;
        let root = xr::expect_root(&doc, "vehicleDefinitions")?;
        let types = xr::children(&root, "vehicleType")
            .map(|n| read_vehicle_type(&n))
            .collect::<Result<Vec<_>, _>>()?;
        let vehicles = xr::children(&root, "vehicle")
            .map(|n| {
                Ok(Vehicle {
                    id: xr::required_attr(&n, "id")?.to_string(),
                    vehicle_type: xr::required_attr(&n, "type")?.to_string(),
                })
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;
        Ok(VehicleDefinitions { types, vehicles })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        write_document(path, |writer| self.to_xml(writer))
    }

    pub fn to_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> std::io::Result<()> {
        writer.declaration()?;
        writer.start(
            "vehicleDefinitions",
            &[
                ("xmlns", String::from(VEHICLES_NAMESPACE)),
                ("xmlns:xsi", String::from(XSI_NAMESPACE)),
                ("xsi:schemaLocation", String::from(VEHICLES_SCHEMA_LOCATION)),
            ],
        )?;
        for vehicle_type in self.types.iter() {
            write_vehicle_type(vehicle_type, writer)?;
        }
        for vehicle in self.vehicles.iter() {
            writer.empty(
                "vehicle",
                &[
                    ("id", vehicle.id.clone()),
                    ("type", vehicle.vehicle_type.clone()),
                ],
            )?;
        }
        writer.end("vehicleDefinitions")
    }

    pub fn vehicle_type(&self, id: &str) -> Option<&VehicleType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn has_vehicle(&self, id: &str) -> bool {
        self.vehicles.iter().any(|v| v.id == id)
    }
}

fn read_vehicle_type(node: &Node) -> Result<VehicleType, DocumentError> {
    let id = xr::required_attr(node, "id")?;
    let mut vehicle_type = VehicleType::new(id);
    vehicle_type.attributes = AttributeBag::from_parent(node)?;
    vehicle_type.description = xr::child(node, "description").and_then(|n| xr::text(&n));
    if let Some(capacity) = xr::child(node, "capacity") {
        vehicle_type.seats = xr::parse_attr(&capacity, "seats")?.unwrap_or(0);
        vehicle_type.standing_room =
            xr::parse_attr(&capacity, "standingRoomInPersons")?.unwrap_or(0);
    }
    if let Some(length) = xr::child(node, "length") {
        vehicle_type.length = xr::parse_required_attr(&length, "meter")?;
    }
    if let Some(width) = xr::child(node, "width") {
        vehicle_type.width = xr::parse_required_attr(&width, "meter")?;
    }
    if let Some(engine) = xr::child(node, "engineInformation") {
        vehicle_type.engine_attributes = Some(AttributeBag::from_parent(&engine)?);
    }
    if let Some(pce) = xr::child(node, "passengerCarEquivalents") {
        vehicle_type.pce = xr::parse_required_attr(&pce, "pce")?;
    }
    if let Some(mode) = xr::child(node, "networkMode") {
        vehicle_type.network_mode = xr::required_attr(&mode, "networkMode")?.to_string();
    }
    if let Some(factor) = xr::child(node, "flowEfficiencyFactor") {
        vehicle_type.flow_efficiency_factor = xr::parse_required_attr(&factor, "factor")?;
    }
    Ok(vehicle_type)
}

/// decimal rendering that always keeps a fractional part, e.g. `1.0`
fn decimal(value: f64) -> String {
    format!("{value:?}")
}

fn write_vehicle_type<W: Write>(
    vehicle_type: &VehicleType,
    writer: &mut XmlWriter<W>,
) -> std::io::Result<()> {
    writer.start("vehicleType", &[("id", vehicle_type.id.clone())])?;
    vehicle_type.attributes.write(writer)?;
    if let Some(description) = &vehicle_type.description {
        writer.text_element("description", &[], description)?;
    }
    writer.empty(
        "capacity",
        &[
            ("seats", vehicle_type.seats.to_string()),
            (
                "standingRoomInPersons",
                vehicle_type.standing_room.to_string(),
            ),
        ],
    )?;
    writer.empty("length", &[("meter", decimal(vehicle_type.length))])?;
    writer.empty("width", &[("meter", decimal(vehicle_type.width))])?;
    if let Some(engine) = &vehicle_type.engine_attributes {
        writer.start("engineInformation", &[])?;
        engine.write(writer)?;
        writer.end("engineInformation")?;
    }
    writer.empty("costInformation", &[])?;
    writer.empty(
        "passengerCarEquivalents",
        &[("pce", decimal(vehicle_type.pce))],
    )?;
    writer.empty(
        "networkMode",
        &[("networkMode", vehicle_type.network_mode.clone())],
    )?;
    writer.empty(
        "flowEfficiencyFactor",
        &[("factor", decimal(vehicle_type.flow_efficiency_factor))],
    )?;
    writer.end("vehicleType")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Attribute;

    fn sample() -> VehicleDefinitions {
        let mut bus = VehicleType::new("Bus_veh_type");
        bus.attributes
            .set(Attribute::double("accessTimeInSecondsPerPerson", 0.5));
        bus.seats = 40;
        bus.standing_room = 30;
        bus.length = 12.0;
        bus.width = 2.5;
        bus.engine_attributes = Some(AttributeBag(vec![Attribute::string(
            "HbefaVehicleCategory",
            "NON_HBEFA_VEHICLE",
        )]));
        VehicleDefinitions {
            types: vec![bus],
            vehicles: vec![Vehicle {
                id: String::from("pt_kyotobus-205-0"),
                vehicle_type: String::from("Bus_veh_type"),
            }],
        }
    }

    #[test]
    fn test_write_then_read() {
        let definitions = sample();
        let mut writer = XmlWriter::new(Vec::new());
        definitions.to_xml(&mut writer).expect("write to vec");
        let xml = String::from_utf8(writer.into_inner()).expect("utf8");
        assert!(xml.contains(r#"xmlns="http://www.matsim.org/files/dtd""#));
        assert!(xml.contains(r#"<passengerCarEquivalents pce="1.0"/>"#));
        assert!(xml.contains(r#"<length meter="12.0"/>"#));
        let reread = VehicleDefinitions::from_xml_str(&xml).expect("reread");
        assert_eq!(definitions, reread);
    }

    #[test]
    fn test_read_without_engine_block() {
        let xml = r#"<vehicleDefinitions xmlns="http://www.matsim.org/files/dtd">
            <vehicleType id="RE_RB_veh_type">
                <capacity seats="200" standingRoomInPersons="300"/>
                <length meter="100.0"/>
                <width meter="3.0"/>
            </vehicleType>
            <vehicle id="v1" type="RE_RB_veh_type"/>
        </vehicleDefinitions>"#;
        let definitions = VehicleDefinitions::from_xml_str(xml).expect("valid document");
        let rail = definitions
            .vehicle_type("RE_RB_veh_type")
            .expect("type present");
        assert_eq!(rail.seats, 200);
        assert_eq!(rail.standing_room, 300);
        assert_eq!(rail.engine_attributes, None);
        assert!(definitions.has_vehicle("v1"));
        assert!(!definitions.has_vehicle("v2"));
    }
}
