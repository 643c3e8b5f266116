use std::collections::HashMap;

use super::raw_timetable::RawMasterFile;

/// station and route type names keyed by their export codes.
#[derive(Debug, Clone, Default)]
pub struct StationMaster {
    stations: HashMap<String, String>,
    route_types: HashMap<String, String>,
}

impl StationMaster {
    pub fn station_name(&self, code: &str) -> Option<&str> {
        self.stations.get(code).map(String::as_str)
    }

    pub fn route_type_name(&self, code: &str) -> Option<&str> {
        self.route_types.get(code).map(String::as_str)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

impl From<RawMasterFile> for StationMaster {
    fn from(value: RawMasterFile) -> Self {
        let stations = value
            .master
            .st
            .into_iter()
            .map(|e| (e.c, e.n))
            .collect::<HashMap<_, _>>();
        let route_types = value
            .master
            .tt
            .into_iter()
            .map(|e| (e.c, e.n))
            .collect::<HashMap<_, _>>();
        StationMaster {
            stations,
            route_types,
        }
    }
}

impl FromIterator<(&'static str, &'static str)> for StationMaster {
    /// builds a station-only lookup, used for fixtures.
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        StationMaster {
            stations: iter
                .into_iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
            route_types: HashMap::new(),
        }
    }
}
