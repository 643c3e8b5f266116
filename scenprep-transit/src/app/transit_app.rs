use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::{
    schedule::{
        build_ops, build_ops::DEFAULT_TRANSPORT_MODE, merge_ops, patch_ops,
        patch_ops::DEFAULT_PATCHED_MODE, reproject_ops, validation, DuplicateStopPolicy,
    },
    timetable::{timetable_ops, timetable_ops::DEFAULT_UTC_OFFSET_HOURS},
    vehicles::{assign_ops, fleet_ops, merge_ops as vehicle_merge_ops, ModeMapping},
    TransitPrepError,
};

/// Command line tool for preparing transit schedules and vehicles of a simulation scenario
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct TransitApp {
    #[command(subcommand)]
    pub op: TransitOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum TransitOperation {
    /// merge several transit schedule documents into one
    MergeSchedules {
        /// schedule files, or directories whose *.xml files are read in name order
        #[arg(required = true)]
        inputs: Vec<String>,

        /// merged schedule file
        #[arg(short, long, default_value_t=String::from("transitSchedule.xml"))]
        output_file: String,

        /// how a stop id already present in the merged schedule is handled
        #[arg(long, value_enum, default_value_t=DuplicateStopPolicy::Rename)]
        duplicate_stops: DuplicateStopPolicy,
    },
    /// reproject stop coordinates between WGS84 and a UTM zone
    Reproject {
        #[arg(short, long)]
        input_file: String,

        #[arg(short, long)]
        output_file: String,

        /// UTM zone as an EPSG code, e.g. EPSG:32653
        #[arg(long, default_value_t=String::from("EPSG:32653"))]
        epsg: String,

        /// map UTM coordinates back to WGS84
        #[arg(long)]
        inverse: bool,

        /// fail on coordinates outside the valid domain instead of warning
        #[arg(long)]
        strict: bool,

        /// write the target system into the coordinateReferenceSystem attribute
        #[arg(long)]
        set_crs: bool,
    },
    /// overwrite the transport mode of routes whose id contains a substring
    PatchMode {
        #[arg(short, long)]
        input_file: String,

        #[arg(short, long)]
        output_file: String,

        /// route id substrings, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = patch_ops::DEFAULT_ROUTE_SUBSTRINGS.map(String::from))]
        route_substrings: Vec<String>,

        #[arg(long, default_value_t=String::from(DEFAULT_PATCHED_MODE))]
        transport_mode: String,
    },
    /// report structural problems of a transit schedule
    Validate {
        #[arg(short, long)]
        input_file: String,
    },
    /// derive schedule and stop tables from a raw timetable export
    ExtractTimetable {
        /// raw timetable JSON file
        #[arg(short, long)]
        timetable_file: String,

        /// station and route type lookup JSON file
        #[arg(short, long)]
        master_file: String,

        #[arg(long, default_value_t=String::from("schedule.csv"))]
        schedule_output_file: String,

        #[arg(long, default_value_t=String::from("stops.csv"))]
        stop_output_file: String,

        /// hours east of UTC used to render local clock times
        #[arg(long, default_value_t=DEFAULT_UTC_OFFSET_HOURS, allow_hyphen_values(true))]
        utc_offset_hours: i32,
    },
    /// build a transit schedule document from the stop and schedule tables
    BuildSchedule {
        #[arg(long)]
        stop_file: String,

        #[arg(long)]
        schedule_file: String,

        #[arg(short, long, default_value_t=String::from("transitSchedule.xml"))]
        output_file: String,

        #[arg(long, default_value_t=String::from(DEFAULT_TRANSPORT_MODE))]
        transport_mode: String,

        /// value of the coordinateReferenceSystem attribute
        #[arg(long)]
        crs: Option<String>,
    },
    /// build a vehicle definitions document from vehicle type and count tables
    BuildVehicles {
        #[arg(long)]
        types_file: String,

        #[arg(long)]
        counts_file: String,

        #[arg(short, long, default_value_t=String::from("transitVehicles.xml"))]
        output_file: String,
    },
    /// merge several vehicle definitions documents into one
    MergeVehicles {
        #[arg(required = true)]
        inputs: Vec<String>,

        #[arg(short, long, default_value_t=String::from("transitVehicles.xml"))]
        output_file: String,
    },
    /// give every departure a vehicle of the type mapped from its transport mode
    AssignVehicles {
        #[arg(long)]
        schedule_file: String,

        #[arg(long)]
        vehicles_file: String,

        #[arg(long)]
        output_schedule_file: String,

        #[arg(long)]
        output_vehicles_file: String,

        /// mode=vehicle type pairs separated by ';'
        #[arg(long, default_value_t=ModeMapping::default())]
        mode_mapping: ModeMapping,
    },
}

impl TransitOperation {
    pub fn run(&self) -> Result<(), TransitPrepError> {
        match self {
            TransitOperation::MergeSchedules {
                inputs,
                output_file,
                duplicate_stops,
            } => merge_ops::run(inputs, output_file, *duplicate_stops),
            TransitOperation::Reproject {
                input_file,
                output_file,
                epsg,
                inverse,
                strict,
                set_crs,
            } => reproject_ops::run(input_file, output_file, epsg, *inverse, *strict, *set_crs),
            TransitOperation::PatchMode {
                input_file,
                output_file,
                route_substrings,
                transport_mode,
            } => patch_ops::run(input_file, output_file, route_substrings, transport_mode),
            TransitOperation::Validate { input_file } => validation::run(input_file),
            TransitOperation::ExtractTimetable {
                timetable_file,
                master_file,
                schedule_output_file,
                stop_output_file,
                utc_offset_hours,
            } => timetable_ops::run(
                timetable_file,
                master_file,
                schedule_output_file,
                stop_output_file,
                *utc_offset_hours,
            ),
            TransitOperation::BuildSchedule {
                stop_file,
                schedule_file,
                output_file,
                transport_mode,
                crs,
            } => build_ops::run(
                stop_file,
                schedule_file,
                output_file,
                transport_mode,
                crs.as_deref(),
            ),
            TransitOperation::BuildVehicles {
                types_file,
                counts_file,
                output_file,
            } => fleet_ops::run(types_file, counts_file, output_file),
            TransitOperation::MergeVehicles {
                inputs,
                output_file,
            } => vehicle_merge_ops::run(inputs, output_file),
            TransitOperation::AssignVehicles {
                schedule_file,
                vehicles_file,
                output_schedule_file,
                output_vehicles_file,
                mode_mapping,
            } => assign_ops::run(
                schedule_file,
                vehicles_file,
                output_schedule_file,
                output_vehicles_file,
                mode_mapping,
            ),
        }
    }
}
