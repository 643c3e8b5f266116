use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("Error reading from '{path}': {message}")]
    ReadError { path: PathBuf, message: String },
    #[error("Error writing to '{path}': {message}")]
    WriteError { path: PathBuf, message: String },
    #[error("Failed to parse XML document: {0}")]
    XmlParse(#[from] roxmltree::Error),
    #[error("document does not match the expected schema: {0}")]
    SchemaMismatch(String),
    #[error("invalid time value '{0}', expected HH:MM:SS")]
    InvalidTime(String),
    #[error("invalid numeric value '{value}' for '{field}'")]
    InvalidNumber { field: String, value: String },
    #[error("coordinate transformation failed: {0}")]
    Projection(String),
}
