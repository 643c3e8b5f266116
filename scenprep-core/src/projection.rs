//! WGS84 geographic <-> UTM projected coordinates.
//!
//! coordinates follow the (x, y) axis order throughout: longitude/latitude in
//! degrees on the geographic side, easting/northing in meters on the projected side.
use geo::Coord;
use proj4rs::{proj::Proj, transform::transform};

use crate::DocumentError;

const GEOGRAPHIC_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";
const MIN_LATITUDE: f64 = -80.0;
const MAX_LATITUDE: f64 = 84.0;

/// a UTM zone. zone 53 north (EPSG:32653) covers the Kansai region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub zone: u8,
    pub north: bool,
}

impl UtmZone {
    pub fn new(zone: u8, north: bool) -> Result<UtmZone, DocumentError> {
        if !(1..=60).contains(&zone) {
            return Err(DocumentError::InvalidNumber {
                field: String::from("utm zone"),
                value: zone.to_string(),
            });
        }
        Ok(UtmZone { zone, north })
    }

    /// reads codes of the form `EPSG:326zz` (north) or `EPSG:327zz` (south).
    pub fn from_epsg(code: &str) -> Result<UtmZone, DocumentError> {
        let invalid = || DocumentError::InvalidNumber {
            field: String::from("epsg code"),
            value: code.to_string(),
        };
        let numeric = code
            .trim()
            .strip_prefix("EPSG:")
            .unwrap_or(code.trim())
            .parse::<u32>()
            .map_err(|_| invalid())?;
        match numeric {
            32601..=32660 => UtmZone::new((numeric - 32600) as u8, true),
            32701..=32760 => UtmZone::new((numeric - 32700) as u8, false),
            _ => Err(invalid()),
        }
    }

    pub fn epsg_code(&self) -> String {
        let base = if self.north { 32600 } else { 32700 };
        format!("EPSG:{}", base + self.zone as u32)
    }

    /// proj string of the zone on the WGS84 datum
    pub fn definition(&self) -> String {
        let hemisphere = if self.north { "" } else { " +south" };
        format!(
            "+proj=utm +zone={}{hemisphere} +datum=WGS84 +units=m +no_defs",
            self.zone
        )
    }

    pub fn projection(&self) -> Result<UtmProjection, DocumentError> {
        let definition = self.definition();
        let projected = Proj::from_proj_string(&definition).map_err(|e| {
            DocumentError::Projection(format!("invalid definition '{definition}': {e}"))
        })?;
        let geographic = Proj::from_proj_string(GEOGRAPHIC_DEFINITION).map_err(|e| {
            DocumentError::Projection(format!(
                "invalid definition '{GEOGRAPHIC_DEFINITION}': {e}"
            ))
        })?;
        Ok(UtmProjection {
            zone: *self,
            geographic,
            projected,
        })
    }
}

/// transforms between WGS84 and one UTM zone.
pub struct UtmProjection {
    zone: UtmZone,
    geographic: Proj,
    projected: Proj,
}

impl UtmProjection {
    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// projects a WGS84 (lon, lat) coordinate in degrees into (easting, northing).
    /// no domain checks are applied, see [`is_within_domain`].
    pub fn forward(&self, lonlat: Coord<f64>) -> Result<Coord<f64>, DocumentError> {
        let mut point = (lonlat.x.to_radians(), lonlat.y.to_radians(), 0.0);
        transform(&self.geographic, &self.projected, &mut point).map_err(|e| {
            DocumentError::Projection(format!(
                "({}, {}) to {}: {e}",
                lonlat.x,
                lonlat.y,
                self.zone.epsg_code()
            ))
        })?;
        Ok(Coord {
            x: point.0,
            y: point.1,
        })
    }

    /// recovers the WGS84 (lon, lat) coordinate in degrees from (easting, northing).
    pub fn inverse(&self, en: Coord<f64>) -> Result<Coord<f64>, DocumentError> {
        let mut point = (en.x, en.y, 0.0);
        transform(&self.projected, &self.geographic, &mut point).map_err(|e| {
            DocumentError::Projection(format!(
                "({}, {}) from {}: {e}",
                en.x,
                en.y,
                self.zone.epsg_code()
            ))
        })?;
        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    }
}

/// true if the (lon, lat) coordinate lies within the valid domain of the
/// geographic system and the latitude band covered by UTM.
pub fn is_within_domain(lonlat: Coord<f64>) -> bool {
    lonlat.x.is_finite()
        && lonlat.y.is_finite()
        && (-180.0..=180.0).contains(&lonlat.x)
        && (MIN_LATITUDE..=MAX_LATITUDE).contains(&lonlat.y)
}

#[cfg(test)]
mod test {
    use super::*;

    fn zone_53n() -> UtmProjection {
        UtmZone::new(53, true)
            .and_then(|z| z.projection())
            .expect("valid zone")
    }

    #[test]
    fn test_central_meridian_on_equator() {
        let en = zone_53n()
            .forward(Coord { x: 135.0, y: 0.0 })
            .expect("projects");
        assert!((en.x - 500_000.0).abs() < 1e-3);
        assert!(en.y.abs() < 1e-3);
    }

    #[test]
    fn test_central_meridian_at_45_degrees() {
        // k0 * meridian arc length to 45 degrees on WGS84
        let en = zone_53n()
            .forward(Coord { x: 135.0, y: 45.0 })
            .expect("projects");
        assert!((en.x - 500_000.0).abs() < 1e-3);
        assert!((en.y - 4_982_950.4).abs() < 0.05, "northing was {}", en.y);
    }

    #[test]
    fn test_symmetric_about_central_meridian() {
        let zone = zone_53n();
        let east = zone.forward(Coord { x: 136.5, y: 35.0 }).expect("projects");
        let west = zone.forward(Coord { x: 133.5, y: 35.0 }).expect("projects");
        assert!(((east.x - 500_000.0) + (west.x - 500_000.0)).abs() < 1e-3);
        assert!((east.y - west.y).abs() < 1e-3);
    }

    #[test]
    fn test_forward_inverse_round_trip() {
        let zone = zone_53n();
        for (lon, lat) in [(135.7588, 34.9858), (135.6, 35.1), (137.9, 33.2)] {
            let en = zone.forward(Coord { x: lon, y: lat }).expect("projects");
            let back = zone.inverse(en).expect("inverts");
            assert!((back.x - lon).abs() < 1e-7, "lon {lon} became {}", back.x);
            assert!((back.y - lat).abs() < 1e-7, "lat {lat} became {}", back.y);
        }
    }

    #[test]
    fn test_southern_hemisphere_false_northing() {
        let zone = UtmZone::new(56, false)
            .and_then(|z| z.projection())
            .expect("valid zone");
        let en = zone
            .forward(Coord { x: 151.2, y: -33.87 })
            .expect("projects");
        assert!(en.y > 6_000_000.0 && en.y < 10_000_000.0);
        let back = zone.inverse(en).expect("inverts");
        assert!((back.y + 33.87).abs() < 1e-7);
    }

    #[test]
    fn test_epsg_codes() {
        let zone = UtmZone::from_epsg("EPSG:32653").expect("valid code");
        assert_eq!(zone, UtmZone { zone: 53, north: true });
        assert_eq!(zone.epsg_code(), "EPSG:32653");
        assert_eq!(
            zone.definition(),
            "+proj=utm +zone=53 +datum=WGS84 +units=m +no_defs"
        );
        let south = UtmZone::from_epsg("32756").expect("valid code");
        assert!(south.definition().contains("+zone=56 +south"));
        assert!(UtmZone::from_epsg("EPSG:4326").is_err());
        assert!(UtmZone::new(0, true).is_err());
    }

    #[test]
    fn test_domain() {
        assert!(is_within_domain(Coord { x: 135.7, y: 34.9 }));
        assert!(!is_within_domain(Coord { x: 200.0, y: 34.9 }));
        assert!(!is_within_domain(Coord { x: 135.7, y: 88.0 }));
    }
}
