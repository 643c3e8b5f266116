use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::{
    commuter,
    config::PopulationConfig,
    generator::PopulationGenerator,
    poi::{read_pois, PoiPools},
    PopulationError,
};

/// Command line tool for generating synthetic tourist populations
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct PopulationApp {
    #[command(subcommand)]
    pub op: PopulationOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum PopulationOperation {
    /// generate a population of tourist agents with day plans over points of interest
    Generate {
        /// configuration file (TOML). missing keys take their defaults.
        #[arg(short, long)]
        config_file: String,

        /// overrides the output file of the configuration
        #[arg(short, long)]
        output_file: Option<String>,

        /// overrides the random seed of the configuration
        #[arg(long)]
        seed: Option<u64>,
    },
    /// sum person weights per (home, work) location pair of an activity table
    CommuterMatrix {
        /// activity table CSV with p_id, type, location and a_weight columns
        #[arg(short, long)]
        activity_file: String,

        /// output CSV with home, work and n columns
        #[arg(short, long, default_value_t = String::from(commuter::DEFAULT_OUTPUT_FILE))]
        output_file: String,
    },
}

impl PopulationOperation {
    pub fn run(&self) -> Result<(), PopulationError> {
        match self {
            PopulationOperation::Generate {
                config_file,
                output_file,
                seed,
            } => {
                let mut config = PopulationConfig::from_file(config_file)?;
                if let Some(output_file) = output_file {
                    config.output_file = output_file.clone();
                }
                if seed.is_some() {
                    config.seed = *seed;
                }
                run(&config)
            }
            PopulationOperation::CommuterMatrix {
                activity_file,
                output_file,
            } => commuter::run(activity_file, output_file),
        }
    }
}

pub fn run(config: &PopulationConfig) -> Result<(), PopulationError> {
    log::info!("reading points of interest from {}", config.poi_file);
    let pois = read_pois(&config.poi_file)?;
    let pools = PoiPools::split(pois, &config.anchor_types);
    log::info!(
        "{} anchor locations and {} visit locations",
        pools.anchors.len(),
        pools.visits.len()
    );
    let mut generator = PopulationGenerator::new(config, &pools)?;
    let population = generator.generate(config.agents)?;
    population.write(&config.output_file)?;
    log::info!(
        "generated {} tourist agents in '{}'",
        population.persons.len(),
        config.output_file
    );
    Ok(())
}
