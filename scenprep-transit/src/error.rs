use std::path::PathBuf;

use scenprep_core::DocumentError;

#[derive(thiserror::Error, Debug)]
pub enum TransitPrepError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Invalid input: {0}")]
    InvalidUserInput(String),
    #[error("Error with csv file '{path}': {message}")]
    CsvError { path: PathBuf, message: String },
    #[error("Error with json file '{path}': {message}")]
    JsonError { path: PathBuf, message: String },
    #[error("Unresolvable reference: {0}")]
    UnresolvableReference(String),
    #[error("coordinate ({x}, {y}) of stop '{stop_id}' is outside the valid domain of the projection")]
    OutOfRangeCoordinate { stop_id: String, x: f64, y: f64 },
    #[error("error due to dataset contents: {0}")]
    SchemaMismatch(String),
    #[error("schedule failed validation with {0} error(s)")]
    Validation(usize),
}
