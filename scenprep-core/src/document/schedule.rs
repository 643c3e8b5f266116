use std::{collections::HashSet, io::Write, path::Path};

use geo::Coord;
use roxmltree::Node;

use super::{write_document, xml_read_ops as xr, AttributeBag, XmlWriter};
use crate::{time::ClockTime, util::fs, DocumentError};

pub const TRANSIT_SCHEDULE_DTD: &str = "http://www.matsim.org/files/dtd/transitSchedule_v2.dtd";
/// name of the document-level attribute holding the coordinate reference system
pub const CRS_ATTRIBUTE: &str = "coordinateReferenceSystem";
/// root children that are read into the typed model
const MODELED_ROOT_ELEMENTS: [&str; 5] = [
    "attributes",
    "transitStops",
    "minimalTransferTimes",
    "transitLines",
    "transitLine",
];

/// a transit schedule document: stop facilities plus lines of routes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitSchedule {
    pub attributes: AttributeBag,
    pub stops: Vec<StopFacility>,
    pub minimal_transfer_times: Vec<MinimalTransferTime>,
    pub lines: Vec<TransitLine>,
    /// root children without a model, kept as their source text and
    /// written back unchanged
    pub extra_elements: Vec<String>,
}

/// shortest time needed to change from one stop facility to another
#[derive(Debug, Clone, PartialEq)]
pub struct MinimalTransferTime {
    pub from_stop: String,
    pub to_stop: String,
    /// seconds
    pub transfer_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopFacility {
    pub id: String,
    pub coord: Coord<f64>,
    pub name: Option<String>,
    pub link_ref_id: Option<String>,
    pub is_blocking: Option<bool>,
    pub stop_area_id: Option<String>,
    pub attributes: AttributeBag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitLine {
    pub id: String,
    pub name: Option<String>,
    pub attributes: AttributeBag,
    pub routes: Vec<TransitRoute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitRoute {
    pub id: String,
    pub description: Option<String>,
    pub transport_mode: Option<String>,
    pub attributes: AttributeBag,
    /// ordered stops served by this route with their offsets
    pub profile: Vec<RouteProfileStop>,
    /// ordered network link ids traversed by this route
    pub links: Vec<String>,
    pub departures: Vec<Departure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteProfileStop {
    pub ref_id: String,
    pub arrival_offset: Option<ClockTime>,
    pub departure_offset: Option<ClockTime>,
    pub await_departure: Option<bool>,
    pub allow_boarding: Option<bool>,
    pub allow_alighting: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub id: String,
    pub departure_time: ClockTime,
    pub vehicle_ref_id: Option<String>,
}

/// output formatting choices that are not part of the document itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleWriteOptions {
    /// fixed number of decimal places for stop (x, y) values. shortest
    /// round-trip representation when None.
    pub coordinate_decimals: Option<(usize, usize)>,
}

impl StopFacility {
    pub fn new(id: &str, coord: Coord<f64>) -> StopFacility {
        StopFacility {
            id: id.to_string(),
            coord,
            name: None,
            link_ref_id: None,
            is_blocking: None,
            stop_area_id: None,
            attributes: AttributeBag::default(),
        }
    }
}

impl RouteProfileStop {
    pub fn new(ref_id: &str) -> RouteProfileStop {
        RouteProfileStop {
            ref_id: ref_id.to_string(),
            arrival_offset: None,
            departure_offset: None,
            await_departure: None,
            allow_boarding: None,
            allow_alighting: None,
        }
    }
}

impl TransitRoute {
    pub fn new(id: &str) -> TransitRoute {
        TransitRoute {
            id: id.to_string(),
            description: None,
            transport_mode: None,
            attributes: AttributeBag::default(),
            profile: vec![],
            links: vec![],
            departures: vec![],
        }
    }
}

impl TransitSchedule {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<TransitSchedule, DocumentError> {
        let contents = fs::read_to_string(path.as_ref())?;
        TransitSchedule::from_xml_str(&contents).map_err(|e| DocumentError::ReadError {
            path: path.as_ref().to_owned(),
            message: e.to_string(),
        })
    }

    /// parses a schedule document. stop facilities and lines are collected from
    /// anywhere below the root, so wrapping elements such as `<transitLines>`
    /// are tolerated.
    pub fn from_xml_str(xml: &str) -> Result<TransitSchedule, DocumentError> {
        let doc = xr::parse_document(xml)?;
        let root = xr::expect_root(&doc, "transitSchedule")?;
        let attributes = AttributeBag::from_parent(&root)?;
        let stops = xr::descendants(&root, "stopFacility")
            .map(|n| read_stop(&n))
            .collect::<Result<Vec<_>, _>>()?;
        let minimal_transfer_times = xr::children(&root, "minimalTransferTimes")
            .flat_map(|n| xr::children(&n, "relation").collect::<Vec<_>>())
            .map(|n| read_transfer_time(&n))
            .collect::<Result<Vec<_>, _>>()?;
        let lines = xr::descendants(&root, "transitLine")
            .map(|n| read_line(&n))
            .collect::<Result<Vec<_>, _>>()?;
        let extra_elements = root
            .children()
            .filter(|n| {
                n.is_element() && !MODELED_ROOT_ELEMENTS.contains(&n.tag_name().name())
            })
            .map(|n| xml[n.range()].to_string())
            .collect::<Vec<_>>();
        log::debug!(
            "read transit schedule with {} stops and {} lines",
            stops.len(),
            lines.len()
        );
        Ok(TransitSchedule {
            attributes,
            stops,
            minimal_transfer_times,
            lines,
            extra_elements,
        })
    }

    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        options: &ScheduleWriteOptions,
    ) -> Result<(), DocumentError> {
        write_document(path, |writer| self.to_xml(writer, options))
    }

    pub fn to_xml<W: Write>(
        &self,
        writer: &mut XmlWriter<W>,
        options: &ScheduleWriteOptions,
    ) -> std::io::Result<()> {
        writer.declaration()?;
        writer.doctype("transitSchedule", TRANSIT_SCHEDULE_DTD)?;
        writer.start("transitSchedule", &[])?;
        self.attributes.write(writer)?;
        writer.start("transitStops", &[])?;
        for stop in self.stops.iter() {
            write_stop(stop, writer, options)?;
        }
        writer.end("transitStops")?;
        if !self.minimal_transfer_times.is_empty() {
            writer.start("minimalTransferTimes", &[])?;
            for relation in self.minimal_transfer_times.iter() {
                let attrs = [
                    ("fromStop", relation.from_stop.clone()),
                    ("toStop", relation.to_stop.clone()),
                    ("transferTime", relation.transfer_time.to_string()),
                ];
                writer.empty("relation", &attrs)?;
            }
            writer.end("minimalTransferTimes")?;
        }
        for line in self.lines.iter() {
            write_line(line, writer)?;
        }
        for fragment in self.extra_elements.iter() {
            writer.raw(fragment)?;
        }
        writer.end("transitSchedule")
    }

    pub fn stop(&self, id: &str) -> Option<&StopFacility> {
        self.stops.iter().find(|s| s.id == id)
    }

    pub fn line(&self, id: &str) -> Option<&TransitLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn stop_ids(&self) -> HashSet<&str> {
        self.stops.iter().map(|s| s.id.as_str()).collect()
    }

    /// iterates all routes along with the line that owns them.
    pub fn routes(&self) -> impl Iterator<Item = (&TransitLine, &TransitRoute)> {
        self.lines
            .iter()
            .flat_map(|line| line.routes.iter().map(move |route| (line, route)))
    }

    pub fn routes_mut(&mut self) -> impl Iterator<Item = &mut TransitRoute> {
        self.lines.iter_mut().flat_map(|line| line.routes.iter_mut())
    }
}

fn read_stop(node: &Node) -> Result<StopFacility, DocumentError> {
    Ok(StopFacility {
        id: xr::required_attr(node, "id")?.to_string(),
        coord: Coord {
            x: xr::parse_required_attr(node, "x")?,
            y: xr::parse_required_attr(node, "y")?,
        },
        name: node.attribute("name").map(String::from),
        link_ref_id: node.attribute("linkRefId").map(String::from),
        is_blocking: xr::parse_attr(node, "isBlocking")?,
        stop_area_id: node.attribute("stopAreaId").map(String::from),
        attributes: AttributeBag::from_parent(node)?,
    })
}

fn read_transfer_time(node: &Node) -> Result<MinimalTransferTime, DocumentError> {
    Ok(MinimalTransferTime {
        from_stop: xr::required_attr(node, "fromStop")?.to_string(),
        to_stop: xr::required_attr(node, "toStop")?.to_string(),
        transfer_time: xr::parse_required_attr(node, "transferTime")?,
    })
}

fn read_line(node: &Node) -> Result<TransitLine, DocumentError> {
    let routes = xr::children(node, "transitRoute")
        .map(|n| read_route(&n))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TransitLine {
        id: xr::required_attr(node, "id")?.to_string(),
        name: node.attribute("name").map(String::from),
        attributes: AttributeBag::from_parent(node)?,
        routes,
    })
}

fn read_route(node: &Node) -> Result<TransitRoute, DocumentError> {
    let profile = match xr::child(node, "routeProfile") {
        None => vec![],
        Some(p) => xr::children(&p, "stop")
            .map(|stop| {
                Ok(RouteProfileStop {
                    ref_id: xr::required_attr(&stop, "refId")?.to_string(),
                    arrival_offset: xr::parse_time_attr(&stop, "arrivalOffset")?,
                    departure_offset: xr::parse_time_attr(&stop, "departureOffset")?,
                    await_departure: xr::parse_attr(&stop, "awaitDeparture")?,
                    allow_boarding: xr::parse_attr(&stop, "allowBoarding")?,
                    allow_alighting: xr::parse_attr(&stop, "allowAlighting")?,
                })
            })
            .collect::<Result<Vec<_>, DocumentError>>()?,
    };
    let links = match xr::child(node, "route") {
        None => vec![],
        Some(r) => xr::children(&r, "link")
            .map(|link| xr::required_attr(&link, "refId").map(String::from))
            .collect::<Result<Vec<_>, _>>()?,
    };
    let departures = match xr::child(node, "departures") {
        None => vec![],
        Some(d) => xr::children(&d, "departure")
            .map(|dep| {
                let time = xr::parse_time_attr(&dep, "departureTime")?.ok_or_else(|| {
                    DocumentError::SchemaMismatch(String::from(
                        "<departure> is missing required attribute 'departureTime'",
                    ))
                })?;
                Ok(Departure {
                    id: xr::required_attr(&dep, "id")?.to_string(),
                    departure_time: time,
                    vehicle_ref_id: dep.attribute("vehicleRefId").map(String::from),
                })
            })
            .collect::<Result<Vec<_>, DocumentError>>()?,
    };
    Ok(TransitRoute {
        id: xr::required_attr(node, "id")?.to_string(),
        description: xr::child(node, "description").and_then(|n| xr::text(&n)),
        // an empty element still counts as a (blank) transport mode
        transport_mode: xr::child(node, "transportMode")
            .map(|n| xr::text(&n).unwrap_or_default()),
        attributes: AttributeBag::from_parent(node)?,
        profile,
        links,
        departures,
    })
}

fn format_value(value: f64, decimals: Option<usize>) -> String {
    match decimals {
        Some(d) => format!("{value:.d$}"),
        None => value.to_string(),
    }
}

fn write_stop<W: Write>(
    stop: &StopFacility,
    writer: &mut XmlWriter<W>,
    options: &ScheduleWriteOptions,
) -> std::io::Result<()> {
    let (x_decimals, y_decimals) = match options.coordinate_decimals {
        Some((x, y)) => (Some(x), Some(y)),
        None => (None, None),
    };
    let mut attrs = vec![
        ("id", stop.id.clone()),
        ("x", format_value(stop.coord.x, x_decimals)),
        ("y", format_value(stop.coord.y, y_decimals)),
    ];
    if let Some(link) = &stop.link_ref_id {
        attrs.push(("linkRefId", link.clone()));
    }
    if let Some(name) = &stop.name {
        attrs.push(("name", name.clone()));
    }
    if let Some(area) = &stop.stop_area_id {
        attrs.push(("stopAreaId", area.clone()));
    }
    if let Some(blocking) = stop.is_blocking {
        attrs.push(("isBlocking", blocking.to_string()));
    }
    if stop.attributes.is_empty() {
        writer.empty("stopFacility", &attrs)
    } else {
        writer.start("stopFacility", &attrs)?;
        stop.attributes.write(writer)?;
        writer.end("stopFacility")
    }
}

fn write_line<W: Write>(line: &TransitLine, writer: &mut XmlWriter<W>) -> std::io::Result<()> {
    let mut attrs = vec![("id", line.id.clone())];
    if let Some(name) = &line.name {
        attrs.push(("name", name.clone()));
    }
    writer.start("transitLine", &attrs)?;
    line.attributes.write(writer)?;
    for route in line.routes.iter() {
        write_route(route, writer)?;
    }
    writer.end("transitLine")
}

fn write_route<W: Write>(route: &TransitRoute, writer: &mut XmlWriter<W>) -> std::io::Result<()> {
    writer.start("transitRoute", &[("id", route.id.clone())])?;
    route.attributes.write(writer)?;
    if let Some(description) = &route.description {
        writer.text_element("description", &[], description)?;
    }
    if let Some(mode) = &route.transport_mode {
        writer.text_element("transportMode", &[], mode)?;
    }
    writer.start("routeProfile", &[])?;
    for stop in route.profile.iter() {
        let mut attrs = vec![("refId", stop.ref_id.clone())];
        if let Some(arr) = stop.arrival_offset {
            attrs.push(("arrivalOffset", arr.to_string()));
        }
        if let Some(dep) = stop.departure_offset {
            attrs.push(("departureOffset", dep.to_string()));
        }
        if let Some(wait) = stop.await_departure {
            attrs.push(("awaitDeparture", wait.to_string()));
        }
        if let Some(boarding) = stop.allow_boarding {
            attrs.push(("allowBoarding", boarding.to_string()));
        }
        if let Some(alighting) = stop.allow_alighting {
            attrs.push(("allowAlighting", alighting.to_string()));
        }
        writer.empty("stop", &attrs)?;
    }
    writer.end("routeProfile")?;
    if !route.links.is_empty() {
        writer.start("route", &[])?;
        for link in route.links.iter() {
            writer.empty("link", &[("refId", link.clone())])?;
        }
        writer.end("route")?;
    }
    writer.start("departures", &[])?;
    for departure in route.departures.iter() {
        let mut attrs = vec![
            ("id", departure.id.clone()),
            ("departureTime", departure.departure_time.to_string()),
        ];
        if let Some(vehicle) = &departure.vehicle_ref_id {
            attrs.push(("vehicleRefId", vehicle.clone()));
        }
        writer.empty("departure", &attrs)?;
    }
    writer.end("departures")?;
    writer.end("transitRoute")
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE transitSchedule SYSTEM "http://www.matsim.org/files/dtd/transitSchedule_v2.dtd">
<transitSchedule>
    <attributes>
        <attribute name="coordinateReferenceSystem" class="java.lang.String">EPSG:4326</attribute>
    </attributes>
    <transitStops>
        <stopFacility id="S1" x="135.75" y="34.98" linkRefId="pt_S1" name="Kyoto &amp; Co" isBlocking="false"/>
        <stopFacility id="S2" x="135.76" y="35.01"/>
    </transitStops>
    <minimalTransferTimes>
        <relation fromStop="S1" toStop="S2" transferTime="120.0"/>
    </minimalTransferTimes>
    <transitLines>
        <transitLine id="L1">
            <transitRoute id="R1">
                <transportMode>bus</transportMode>
                <routeProfile>
                    <stop refId="S1" departureOffset="00:00:00" awaitDeparture="true" allowBoarding="true" allowAlighting="false"/>
                    <stop refId="S2" arrivalOffset="00:10:00"/>
                </routeProfile>
                <route>
                    <link refId="pt_S1"/>
                    <link refId="pt_S2"/>
                </route>
                <departures>
                    <departure id="d1" departureTime="08:00:00" vehicleRefId="v1"/>
                    <departure id="d2" departureTime="25:15:00"/>
                </departures>
            </transitRoute>
        </transitLine>
    </transitLines>
    <customData source="survey">
        <entry key="operator">Keifuku &amp; Eizan</entry>
    </customData>
</transitSchedule>"#;

    #[test]
    fn test_read_sample() {
        let schedule = TransitSchedule::from_xml_str(SAMPLE).expect("valid schedule");
        assert_eq!(
            schedule.attributes.get(CRS_ATTRIBUTE).map(|a| a.value.as_str()),
            Some("EPSG:4326")
        );
        assert_eq!(schedule.stops.len(), 2);
        let s1 = schedule.stop("S1").expect("S1 present");
        assert_eq!(s1.name.as_deref(), Some("Kyoto & Co"));
        assert_eq!(s1.is_blocking, Some(false));
        assert_eq!(schedule.lines.len(), 1);
        let route = &schedule.lines[0].routes[0];
        assert_eq!(route.transport_mode.as_deref(), Some("bus"));
        assert_eq!(route.profile.len(), 2);
        assert_eq!(route.profile[0].arrival_offset, None);
        assert_eq!(route.profile[1].arrival_offset, Some(ClockTime::from_hms(0, 10, 0)));
        assert_eq!(route.links, vec!["pt_S1", "pt_S2"]);
        assert_eq!(route.departures[1].departure_time.seconds(), 25 * 3600 + 15 * 60);
        assert_eq!(route.departures[1].vehicle_ref_id, None);
        assert_eq!(route.profile[0].allow_boarding, Some(true));
        assert_eq!(route.profile[0].allow_alighting, Some(false));
        assert_eq!(route.profile[1].allow_boarding, None);
        assert_eq!(
            schedule.minimal_transfer_times,
            vec![MinimalTransferTime {
                from_stop: String::from("S1"),
                to_stop: String::from("S2"),
                transfer_time: 120.0,
            }]
        );
        assert_eq!(schedule.extra_elements.len(), 1);
        assert!(schedule.extra_elements[0].starts_with(r#"<customData source="survey">"#));
    }

    #[test]
    fn test_write_then_read_preserves_document() {
        let schedule = TransitSchedule::from_xml_str(SAMPLE).expect("valid schedule");
        let mut writer = XmlWriter::new(Vec::new());
        schedule
            .to_xml(&mut writer, &ScheduleWriteOptions::default())
            .expect("write to vec");
        let xml = String::from_utf8(writer.into_inner()).expect("utf8");
        let reread = TransitSchedule::from_xml_str(&xml).expect("reread");
        assert_eq!(schedule, reread);
    }

    #[test]
    fn test_file_round_trip_keeps_unmodeled_content() {
        let dir = std::env::temp_dir().join("scenprep-core-schedule-test");
        let schedule = TransitSchedule::from_xml_str(SAMPLE).expect("valid schedule");
        for name in ["schedule.xml", "schedule.xml.gz"] {
            let path = dir.join(name);
            schedule
                .write(&path, &ScheduleWriteOptions::default())
                .expect("write schedule");
            let reread = TransitSchedule::read(&path).expect("read own output");
            assert_eq!(schedule, reread);
        }
        let text = std::fs::read_to_string(dir.join("schedule.xml")).expect("plain text");
        assert!(text.contains("<!DOCTYPE transitSchedule"));
        assert!(text.contains(r#"allowBoarding="true" allowAlighting="false""#));
        assert!(text.contains(r#"<relation fromStop="S1" toStop="S2" transferTime="120"/>"#));
        assert!(text.contains("Keifuku &amp; Eizan"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_empty_transport_mode_is_kept() {
        let xml = r#"<transitSchedule>
            <transitLine id="L1">
                <transitRoute id="R1"><transportMode/></transitRoute>
                <transitRoute id="R2"></transitRoute>
            </transitLine>
        </transitSchedule>"#;
        let schedule = TransitSchedule::from_xml_str(xml).expect("valid schedule");
        let routes = &schedule.lines[0].routes;
        assert_eq!(routes[0].transport_mode.as_deref(), Some(""));
        assert_eq!(routes[1].transport_mode, None);
    }

    #[test]
    fn test_fixed_coordinate_decimals() {
        let mut schedule = TransitSchedule::default();
        schedule
            .stops
            .push(StopFacility::new("a", Coord { x: 1.5, y: 2.25 }));
        let mut writer = XmlWriter::new(Vec::new());
        let options = ScheduleWriteOptions {
            coordinate_decimals: Some((9, 8)),
        };
        schedule.to_xml(&mut writer, &options).expect("write to vec");
        let xml = String::from_utf8(writer.into_inner()).expect("utf8");
        assert!(xml.contains(r#"x="1.500000000" y="2.25000000""#));
    }

    #[test]
    fn test_wrong_root_is_schema_mismatch() {
        let result = TransitSchedule::from_xml_str("<vehicleDefinitions/>");
        assert!(matches!(result, Err(DocumentError::SchemaMismatch(_))));
    }

    #[test]
    fn test_missing_stop_id_is_schema_mismatch() {
        let xml = r#"<transitSchedule><transitStops><stopFacility x="1" y="2"/></transitStops></transitSchedule>"#;
        let result = TransitSchedule::from_xml_str(xml);
        assert!(matches!(result, Err(DocumentError::SchemaMismatch(_))));
    }
}
