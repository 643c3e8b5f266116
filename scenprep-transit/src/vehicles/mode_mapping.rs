use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODE_MAPPING: &str =
    "bus=Bus_veh_type;train=RE_RB_veh_type;train_short=RE_RB_veh_type";

/// transport mode -> vehicle type id, written as `mode=type;mode=type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeMapping(pub BTreeMap<String, String>);

impl ModeMapping {
    pub fn vehicle_type(&self, mode: &str) -> Option<&str> {
        self.0.get(mode).map(String::as_str)
    }
}

impl Default for ModeMapping {
    fn default() -> Self {
        let mut mapping = BTreeMap::new();
        mapping.insert(String::from("bus"), String::from("Bus_veh_type"));
        mapping.insert(String::from("train"), String::from("RE_RB_veh_type"));
        mapping.insert(String::from("train_short"), String::from("RE_RB_veh_type"));
        ModeMapping(mapping)
    }
}

impl FromStr for ModeMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mapping = BTreeMap::new();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (mode, vehicle_type) = entry
                .split_once('=')
                .ok_or_else(|| format!("mode mapping entry '{entry}' is not of the form mode=type"))?;
            let (mode, vehicle_type) = (mode.trim(), vehicle_type.trim());
            if mode.is_empty() || vehicle_type.is_empty() {
                return Err(format!("mode mapping entry '{entry}' has an empty side"));
            }
            mapping.insert(mode.to_string(), vehicle_type.to_string());
        }
        if mapping.is_empty() {
            return Err(String::from("mode mapping is empty"));
        }
        Ok(ModeMapping(mapping))
    }
}

impl Display for ModeMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.iter().map(|(k, v)| format!("{k}={v}")).join(";");
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_text_matches_default_value() {
        let parsed = ModeMapping::from_str(DEFAULT_MODE_MAPPING).expect("valid mapping");
        assert_eq!(parsed, ModeMapping::default());
        assert_eq!(parsed.vehicle_type("train_short"), Some("RE_RB_veh_type"));
        assert_eq!(parsed.vehicle_type("ferry"), None);
    }

    #[test]
    fn test_invalid_mapping() {
        assert!(ModeMapping::from_str("bus").is_err());
        assert!(ModeMapping::from_str("bus=").is_err());
        assert!(ModeMapping::from_str(";").is_err());
    }
}
