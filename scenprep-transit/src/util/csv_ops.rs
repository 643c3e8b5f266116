use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::TransitPrepError;

/// deserializes every row of a CSV file with a header row. columns not
/// named by `T` are ignored.
pub fn read_rows<T, P>(path: P) -> Result<Vec<T>, TransitPrepError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let csv_error = |message: String| TransitPrepError::CsvError {
        path: path.to_owned(),
        message,
    };
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(format!("failure opening file: {e}")))?;
    reader
        .into_deserialize::<T>()
        .enumerate()
        .map(|(idx, r)| r.map_err(|e| csv_error(format!("failure reading row {idx}: {e}"))))
        .collect::<Result<Vec<T>, TransitPrepError>>()
}

/// writes rows with a header row, creating parent directories as needed.
pub fn write_rows<T, P>(path: P, rows: &[T]) -> Result<(), TransitPrepError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let csv_error = |message: String| TransitPrepError::CsvError {
        path: path.to_owned(),
        message,
    };
    if let Some(parent) = path.parent() {
        scenprep_core::util::fs::create_dirs(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(format!("failure opening output file: {e}")))?;
    for (idx, row) in rows.iter().enumerate() {
        writer
            .serialize(row)
            .map_err(|e| csv_error(format!("failure writing CSV output row {idx}: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| csv_error(format!("failure flushing output: {e}")))
}
