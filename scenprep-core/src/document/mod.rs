mod attribute;
mod population;
mod schedule;
mod vehicles;
mod xml_writer;

pub mod xml_read_ops;

pub use attribute::{
    Attribute, AttributeBag, JAVA_BOOLEAN, JAVA_DOUBLE, JAVA_INTEGER, JAVA_LONG, JAVA_STRING,
};
pub use population::{Person, Plan, PlanElement, Population, POPULATION_DTD};
pub use schedule::{
    Departure, MinimalTransferTime, RouteProfileStop, ScheduleWriteOptions, StopFacility,
    TransitLine, TransitRoute, TransitSchedule, CRS_ATTRIBUTE, TRANSIT_SCHEDULE_DTD,
};
pub use vehicles::{Vehicle, VehicleDefinitions, VehicleType};
pub use xml_writer::{escape, write_document, XmlWriter};
