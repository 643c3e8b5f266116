mod population_app;

pub use population_app::{PopulationApp, PopulationOperation};
