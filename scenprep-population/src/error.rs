use std::path::PathBuf;

use scenprep_core::DocumentError;

#[derive(thiserror::Error, Debug)]
pub enum PopulationError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Error with csv file '{path}': {message}")]
    CsvError { path: PathBuf, message: String },
    #[error("failure sampling agent attributes: {0}")]
    Sampling(String),
}
