use std::path::Path;

use serde::{de::Error, Deserialize, Deserializer};

use crate::TransitPrepError;

/// raw timetable export: one entry per train trip.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTimetable {
    pub trains: Vec<RawTrain>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTrain {
    pub summary: RawSummary,
    #[serde(rename = "trainSectionList", default)]
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSummary {
    #[serde(deserialize_with = "de_code")]
    pub tid: String,
    #[serde(default)]
    pub ls: Vec<RawLineSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLineSummary {
    /// route type code
    #[serde(deserialize_with = "de_code")]
    pub tt: String,
}

/// a timed station-to-station section of a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSection {
    /// from station code
    #[serde(deserialize_with = "de_code")]
    pub f: String,
    /// to station code
    #[serde(deserialize_with = "de_code")]
    pub t: String,
    /// route name
    #[serde(default)]
    pub rn: String,
    /// departure instant, unix seconds
    pub fts: f64,
    /// arrival instant, unix seconds
    pub tts: f64,
    /// polyline of space-separated "x,y" tokens
    #[serde(default)]
    pub s: String,
}

/// code-to-name lookup tables of the export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMasterFile {
    pub master: RawMaster,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMaster {
    /// stations
    #[serde(default)]
    pub st: Vec<RawMasterEntry>,
    /// route types
    #[serde(default)]
    pub tt: Vec<RawMasterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMasterEntry {
    #[serde(deserialize_with = "de_code")]
    pub c: String,
    #[serde(default)]
    pub n: String,
}

/// codes appear both as JSON strings and as JSON numbers in the export.
fn de_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number code, found {other}"
        ))),
    }
}

/// reads and deserializes a JSON file.
pub fn read_json<T, P>(path: P) -> Result<T, TransitPrepError>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let contents = scenprep_core::util::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| TransitPrepError::JsonError {
        path: path.to_owned(),
        message: e.to_string(),
    })
}
