use std::collections::HashSet;

use scenprep_core::document::{TransitRoute, TransitSchedule};

use crate::TransitPrepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
}

impl ValidationIssue {
    fn error(message: String) -> ValidationIssue {
        ValidationIssue {
            severity: IssueSeverity::Error,
            message,
        }
    }

    fn warning(message: String) -> ValidationIssue {
        ValidationIssue {
            severity: IssueSeverity::Warning,
            message,
        }
    }
}

/// checks identifier uniqueness, stop references and offset ordering of a
/// schedule document.
pub fn validate_schedule(schedule: &TransitSchedule) -> Vec<ValidationIssue> {
    let mut issues = vec![];
    let mut stop_ids = HashSet::new();
    for stop in schedule.stops.iter() {
        if !stop_ids.insert(stop.id.as_str()) {
            issues.push(ValidationIssue::error(format!(
                "duplicate stop facility id '{}'",
                stop.id
            )));
        }
    }
    let mut line_ids = HashSet::new();
    for line in schedule.lines.iter() {
        if !line_ids.insert(line.id.as_str()) {
            issues.push(ValidationIssue::error(format!(
                "duplicate transit line id '{}'",
                line.id
            )));
        }
        let mut route_ids = HashSet::new();
        for route in line.routes.iter() {
            if !route_ids.insert(route.id.as_str()) {
                issues.push(ValidationIssue::error(format!(
                    "transit line '{}' has duplicate route id '{}'",
                    line.id, route.id
                )));
            }
            let context = format!("transit line '{}', route '{}'", line.id, route.id);
            validate_route(route, &context, &stop_ids, &mut issues);
        }
    }
    issues
}

fn validate_route(
    route: &TransitRoute,
    context: &str,
    stop_ids: &HashSet<&str>,
    issues: &mut Vec<ValidationIssue>,
) {
    if route.profile.len() < 2 {
        issues.push(ValidationIssue::warning(format!(
            "{context} has fewer than two stops"
        )));
    }
    if route.departures.is_empty() {
        issues.push(ValidationIssue::warning(format!(
            "{context} has no departures"
        )));
    }
    let mut departure_ids = HashSet::new();
    for departure in route.departures.iter() {
        if !departure_ids.insert(departure.id.as_str()) {
            issues.push(ValidationIssue::error(format!(
                "{context} has duplicate departure id '{}'",
                departure.id
            )));
        }
    }
    let mut previous = None;
    for (index, stop) in route.profile.iter().enumerate() {
        if !stop_ids.contains(stop.ref_id.as_str()) {
            issues.push(ValidationIssue::error(format!(
                "{context} references unknown stop facility '{}'",
                stop.ref_id
            )));
        }
        if let (Some(arrival), Some(departure)) = (stop.arrival_offset, stop.departure_offset) {
            if departure < arrival {
                issues.push(ValidationIssue::error(format!(
                    "{context} stop {index} ('{}') departs at offset {departure} before arriving at {arrival}",
                    stop.ref_id
                )));
            }
        }
        // running order is checked between stops only, against the latest
        // offset of the stop before
        let offsets = [stop.arrival_offset, stop.departure_offset];
        let earliest = offsets.into_iter().flatten().min();
        if let (Some(prev), Some(offset)) = (previous, earliest) {
            if offset < prev {
                issues.push(ValidationIssue::error(format!(
                    "{context} stop {index} ('{}') has offset {offset} earlier than the preceding {prev}",
                    stop.ref_id
                )));
            }
        }
        if let Some(latest) = offsets.into_iter().flatten().max() {
            previous = Some(latest);
        }
    }
}

pub fn run(input_file: &str) -> Result<(), TransitPrepError> {
    let schedule = TransitSchedule::read(input_file)?;
    let issues = validate_schedule(&schedule);
    let mut errors = 0;
    for issue in issues.iter() {
        match issue.severity {
            IssueSeverity::Error => {
                errors += 1;
                log::error!("{}", issue.message);
            }
            IssueSeverity::Warning => log::warn!("{}", issue.message),
        }
    }
    log::info!(
        "validated {input_file}: {} issues, {errors} errors",
        issues.len()
    );
    if errors > 0 {
        return Err(TransitPrepError::Validation(errors));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use scenprep_core::time::ClockTime;

    const VALID: &str = r#"<transitSchedule>
        <transitStops>
            <stopFacility id="A" x="0" y="0"/>
            <stopFacility id="B" x="1" y="1"/>
        </transitStops>
        <transitLine id="L1">
            <transitRoute id="R1">
                <transportMode>train</transportMode>
                <routeProfile>
                    <stop refId="A" arrivalOffset="00:00:00" departureOffset="00:00:00"/>
                    <stop refId="B" arrivalOffset="00:05:00" departureOffset="00:05:00"/>
                </routeProfile>
                <departures>
                    <departure id="d1" departureTime="08:00:00"/>
                </departures>
            </transitRoute>
        </transitLine>
    </transitSchedule>"#;

    fn errors(issues: &[ValidationIssue]) -> Vec<&ValidationIssue> {
        issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .collect()
    }

    #[test]
    fn test_valid_schedule_has_no_issues() {
        let schedule = TransitSchedule::from_xml_str(VALID).expect("valid xml");
        assert!(validate_schedule(&schedule).is_empty());
    }

    #[test]
    fn test_unknown_stop_and_duplicate_ids() {
        let mut schedule = TransitSchedule::from_xml_str(VALID).expect("valid xml");
        let duplicate_stop = schedule.stops[0].clone();
        schedule.stops.push(duplicate_stop);
        let line = &mut schedule.lines[0];
        line.routes[0].profile[1].ref_id = String::from("missing");
        let duplicate_route = line.routes[0].clone();
        line.routes.push(duplicate_route);
        let issues = validate_schedule(&schedule);
        let errors = errors(&issues);
        assert!(errors.iter().any(|i| i.message.contains("duplicate stop facility id 'A'")));
        assert!(errors.iter().any(|i| i.message.contains("unknown stop facility 'missing'")));
        assert!(errors.iter().any(|i| i.message.contains("duplicate route id 'R1'")));
    }

    #[test]
    fn test_decreasing_offsets_are_errors() {
        let mut schedule = TransitSchedule::from_xml_str(VALID).expect("valid xml");
        let route = &mut schedule.lines[0].routes[0];
        route.profile[0].departure_offset = Some(ClockTime::from_hms(0, 10, 0));
        route.profile[1].departure_offset = Some(ClockTime::from_hms(0, 4, 0));
        let issues = validate_schedule(&schedule);
        let errors = errors(&issues);
        assert!(errors.iter().any(|i| i.message.contains("earlier than the preceding")));
        assert!(errors.iter().any(|i| i.message.contains("before arriving")));
    }

    #[test]
    fn test_departure_before_arrival_reported_once() {
        let mut schedule = TransitSchedule::from_xml_str(VALID).expect("valid xml");
        let route = &mut schedule.lines[0].routes[0];
        route.profile[1].departure_offset = Some(ClockTime::from_hms(0, 4, 0));
        let issues = validate_schedule(&schedule);
        let errors = errors(&issues);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("before arriving"));
    }

    #[test]
    fn test_short_route_is_warning() {
        let mut schedule = TransitSchedule::from_xml_str(VALID).expect("valid xml");
        schedule.lines[0].routes[0].profile.truncate(1);
        let issues = validate_schedule(&schedule);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Warning);
    }
}
