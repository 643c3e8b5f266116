use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::PopulationError;

/// mean and standard deviation of a normally distributed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParameters {
    pub mean: f64,
    pub std_dev: f64,
}

/// attribute values shared by every generated agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedAttributes {
    pub employed: bool,
    pub car_avail: String,
    pub bike_avail: String,
    pub pt_abo_avail: String,
    pub has_license: String,
    pub economic_status: String,
    pub restricted_mobility: bool,
    pub household_type: String,
    pub gem: i64,
    pub ars: i64,
    pub regio_star7: i64,
    pub subpopulation: String,
}

impl Default for FixedAttributes {
    fn default() -> Self {
        FixedAttributes {
            employed: true,
            car_avail: String::from("always"),
            bike_avail: String::from("always"),
            pt_abo_avail: String::from("never"),
            has_license: String::from("yes"),
            economic_status: String::from("high"),
            restricted_mobility: false,
            household_type: String::from("multi_wo_children"),
            gem: 12065136,
            ars: 120650136136,
            regio_star7: 3,
            subpopulation: String::from("person"),
        }
    }
}

/// settings of the tourist population generator. every key is optional in
/// the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// number of agents to generate
    pub agents: usize,
    /// points of interest CSV with columns type, x_coord, y_coord, duration, gravity
    pub poi_file: String,
    /// population document, gzip-compressed when ending in `.gz`
    pub output_file: String,
    /// fixes the random number stream when set
    pub seed: Option<u64>,
    pub age: NormalParameters,
    pub income: NormalParameters,
    pub household_sizes: Vec<u32>,
    pub sex_options: Vec<String>,
    pub employment_options: Vec<String>,
    pub household_equivalent_size_min: f64,
    pub household_equivalent_size_max: f64,
    /// POI types where plans start and end
    pub anchor_types: Vec<String>,
    /// minutes added before the end of every activity
    pub travel_allowance_minutes: u32,
    pub start_hour_min: u32,
    /// inclusive
    pub start_hour_max: u32,
    pub start_minutes: Vec<u32>,
    /// POI visits between the two anchor activities
    pub visits: usize,
    pub leg_mode: String,
    pub fixed_attributes: FixedAttributes,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            agents: 500,
            poi_file: String::from("kyoto_points_of_interest.csv"),
            output_file: String::from("kyoto_tourists_population.xml.gz"),
            seed: None,
            age: NormalParameters {
                mean: 35.0,
                std_dev: 10.0,
            },
            income: NormalParameters {
                mean: 2500.0,
                std_dev: 800.0,
            },
            household_sizes: vec![1, 2, 3, 4],
            sex_options: vec![String::from("m"), String::from("f")],
            employment_options: vec![
                String::from("job_full_time"),
                String::from("job_part_time"),
                String::from("unemployed"),
            ],
            household_equivalent_size_min: 1.0,
            household_equivalent_size_max: 2.5,
            anchor_types: vec![String::from("hotel"), String::from("kyoto_station")],
            travel_allowance_minutes: 15,
            start_hour_min: 8,
            start_hour_max: 14,
            start_minutes: vec![0, 15, 30, 45],
            visits: 3,
            leg_mode: String::from("walk"),
            fixed_attributes: FixedAttributes::default(),
        }
    }
}

impl PopulationConfig {
    /// reads a configuration file. the format follows the file extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<PopulationConfig, PopulationError> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| {
                let msg = format!("file '{}' produced error: {e}", path.to_string_lossy());
                PopulationError::Configuration(msg)
            })?;
        let population_config: PopulationConfig = config.try_deserialize().map_err(|e| {
            let msg = format!(
                "error reading population settings in '{}': {e}",
                path.to_string_lossy()
            );
            PopulationError::Configuration(msg)
        })?;
        population_config.validate()?;
        Ok(population_config)
    }

    pub fn validate(&self) -> Result<(), PopulationError> {
        let mut problems = vec![];
        for (name, params) in [("age", &self.age), ("income", &self.income)] {
            if !params.mean.is_finite() || !params.std_dev.is_finite() || params.std_dev < 0.0 {
                problems.push(format!(
                    "{name} needs a finite mean and a non-negative standard deviation"
                ));
            }
        }
        if self.household_sizes.is_empty() {
            problems.push(String::from("household_sizes is empty"));
        }
        if self.sex_options.is_empty() {
            problems.push(String::from("sex_options is empty"));
        }
        if self.employment_options.is_empty() {
            problems.push(String::from("employment_options is empty"));
        }
        if self.anchor_types.is_empty() {
            problems.push(String::from("anchor_types is empty"));
        }
        if self.start_minutes.is_empty() {
            problems.push(String::from("start_minutes is empty"));
        }
        if self.start_hour_min > self.start_hour_max {
            problems.push(format!(
                "start_hour_min {} is after start_hour_max {}",
                self.start_hour_min, self.start_hour_max
            ));
        }
        if self.start_hour_max > 23 {
            problems.push(format!(
                "start_hour_max {} is not an hour of the day",
                self.start_hour_max
            ));
        }
        if self.start_minutes.iter().any(|m| *m >= 60) {
            problems.push(String::from("start_minutes must all be below 60"));
        }
        if self.household_equivalent_size_min > self.household_equivalent_size_max {
            problems.push(format!(
                "household_equivalent_size_min {} is above household_equivalent_size_max {}",
                self.household_equivalent_size_min, self.household_equivalent_size_max
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(PopulationError::Configuration(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = std::env::temp_dir().join("scenprep-population-config-test");
        std::fs::create_dir_all(&dir).expect("create test dir");
        let file = dir.join("population.toml");
        let toml = r#"
agents = 20
seed = 42
poi_file = "pois.csv"
anchor_types = ["hotel"]

[income]
mean = 3000.0
std_dev = 500.0
"#;
        std::fs::write(&file, toml).expect("write config");
        let config = PopulationConfig::from_file(&file).expect("config loads");
        assert_eq!(config.agents, 20);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.poi_file, "pois.csv");
        assert_eq!(config.anchor_types, vec!["hotel"]);
        assert_eq!(config.income.mean, 3000.0);
        assert_eq!(config.age, PopulationConfig::default().age);
        assert_eq!(config.visits, 3);
        assert_eq!(config.fixed_attributes.ars, 120650136136);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_validate_rejects_empty_options() {
        let config = PopulationConfig {
            sex_options: vec![],
            start_hour_min: 15,
            ..Default::default()
        };
        match config.validate() {
            Err(PopulationError::Configuration(msg)) => {
                assert!(msg.contains("sex_options"));
                assert!(msg.contains("start_hour_min"));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(PopulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_clock_values() {
        let config = PopulationConfig {
            start_hour_max: 30,
            start_minutes: vec![0, 75],
            ..Default::default()
        };
        match config.validate() {
            Err(PopulationError::Configuration(msg)) => {
                assert!(msg.contains("start_hour_max 30"));
                assert!(msg.contains("start_minutes"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
