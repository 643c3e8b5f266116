use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PopulationError;

/// a row of the points of interest table. other columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    #[serde(rename = "type")]
    pub poi_type: String,
    pub x_coord: f64,
    pub y_coord: f64,
    /// minutes spent at the location
    #[serde(default)]
    pub duration: f64,
    /// attractiveness, used as a sampling weight
    #[serde(default)]
    pub gravity: f64,
}

impl PointOfInterest {
    /// whole minutes of the visit, negative durations count as zero.
    pub fn duration_minutes(&self) -> u32 {
        self.duration.max(0.0) as u32
    }
}

/// points of interest split into plan anchors (start and end of the day) and
/// visit candidates.
#[derive(Debug, Clone, Default)]
pub struct PoiPools {
    pub anchors: Vec<PointOfInterest>,
    pub visits: Vec<PointOfInterest>,
}

impl PoiPools {
    pub fn split(pois: Vec<PointOfInterest>, anchor_types: &[String]) -> PoiPools {
        let (anchors, visits) = pois
            .into_iter()
            .partition(|p| anchor_types.iter().any(|t| t == &p.poi_type));
        PoiPools { anchors, visits }
    }

    pub fn total_visit_gravity(&self) -> f64 {
        self.visits.iter().map(|p| p.gravity).sum()
    }
}

pub fn read_pois<P: AsRef<Path>>(path: P) -> Result<Vec<PointOfInterest>, PopulationError> {
    let path = path.as_ref();
    let csv_error = |message: String| PopulationError::CsvError {
        path: path.to_owned(),
        message,
    };
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(e.to_string()))?;
    reader
        .into_deserialize::<PointOfInterest>()
        .enumerate()
        .map(|(idx, row)| row.map_err(|e| csv_error(format!("row {idx}: {e}"))))
        .collect()
}
