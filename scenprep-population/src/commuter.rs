//! home to work commuter flows aggregated from an activity table.
use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::PopulationError;

pub const HOME_ACTIVITY: &str = "home";
pub const WORK_ACTIVITY: &str = "work";
pub const DEFAULT_OUTPUT_FILE: &str = "work-commuter.csv";

/// a row of the activity table. other columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub p_id: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    /// location (zone) id, may be written as a float
    pub location: Option<f64>,
    /// person weight, repeated on every row of the person
    pub a_weight: Option<f64>,
}

/// where one person lives and works
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeWorkRelation {
    pub home: i64,
    pub work: i64,
    pub weight: f64,
}

/// a cell of the commuter matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuterFlow {
    pub home: i64,
    pub work: i64,
    pub n: f64,
}

/// home and work location of one person's home and work activities, in
/// table order. later activities of the same type replace earlier ones and
/// the weight is taken from the first activity. None when the home, the
/// work location or the weight is missing.
pub fn home_work_relation(activities: &[&ActivityRow]) -> Option<HomeWorkRelation> {
    let mut home = None;
    let mut work = None;
    for activity in activities.iter() {
        match activity.activity_type.as_str() {
            HOME_ACTIVITY => home = activity.location,
            WORK_ACTIVITY => work = activity.location,
            _ => {}
        }
    }
    let weight = activities.first().and_then(|a| a.a_weight)?;
    let (home, work) = (location_id(home?)?, location_id(work?)?);
    if !weight.is_finite() {
        return None;
    }
    Some(HomeWorkRelation { home, work, weight })
}

fn location_id(location: f64) -> Option<i64> {
    if location.is_finite() {
        Some(location.trunc() as i64)
    } else {
        None
    }
}

/// sums the person weights of every (home, work) pair, ordered by the pair.
/// people without both a home and a work activity are left out.
pub fn commuter_matrix(rows: &[ActivityRow]) -> Vec<CommuterFlow> {
    let mut person_index: HashMap<&str, usize> = HashMap::new();
    let mut persons: Vec<Vec<&ActivityRow>> = vec![];
    for row in rows
        .iter()
        .filter(|r| r.activity_type == HOME_ACTIVITY || r.activity_type == WORK_ACTIVITY)
    {
        let index = *person_index.entry(row.p_id.as_str()).or_insert_with(|| {
            persons.push(vec![]);
            persons.len() - 1
        });
        persons[index].push(row);
    }

    let relations = persons
        .par_iter()
        .filter_map(|activities| home_work_relation(activities))
        .collect::<Vec<_>>();
    log::info!(
        "found home and work locations for {} of {} persons",
        relations.len(),
        persons.len()
    );

    let mut flows: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for relation in relations.iter() {
        *flows.entry((relation.home, relation.work)).or_default() += relation.weight;
    }
    flows
        .into_iter()
        .map(|((home, work), n)| CommuterFlow { home, work, n })
        .collect()
}

pub fn read_activities<P: AsRef<Path>>(path: P) -> Result<Vec<ActivityRow>, PopulationError> {
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
        .into_deserialize::<ActivityRow>()
        .enumerate()
        .map(|(idx, row)| row.map_err(|e| csv_error(format!("row {idx}: {e}"))))
        .collect()
}

pub fn write_flows<P: AsRef<Path>>(path: P, flows: &[CommuterFlow]) -> Result<(), PopulationError> {
    let path = path.as_ref();
    let csv_error = |message: String| PopulationError::CsvError {
        path: path.to_owned(),
        message,
    };
    if let Some(parent) = path.parent() {
        scenprep_core::util::fs::create_dirs(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(e.to_string()))?;
    for flow in flows.iter() {
        writer
            .serialize(flow)
            .map_err(|e| csv_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| csv_error(e.to_string()))
}

pub fn run(activity_file: &str, output_file: &str) -> Result<(), PopulationError> {
    let rows = read_activities(activity_file)?;
    log::info!("read {} activities from {activity_file}", rows.len());
    let flows = commuter_matrix(&rows);
    write_flows(output_file, &flows)?;
    log::info!("wrote {} home-work pairs to {output_file}", flows.len());
    Ok(())
}
