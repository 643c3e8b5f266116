use scenprep_core::document::{ScheduleWriteOptions, TransitSchedule};

use crate::TransitPrepError;

pub const DEFAULT_ROUTE_SUBSTRINGS: [&str; 2] = ["叡山", "嵐電"];
pub const DEFAULT_PATCHED_MODE: &str = "train_short";

/// overwrites the transport mode of every route whose id contains one of
/// `substrings`. routes without a transportMode element are left alone, an
/// empty element is overwritten. returns the number of routes patched.
pub fn patch_transport_mode(
    schedule: &mut TransitSchedule,
    substrings: &[String],
    mode: &str,
) -> usize {
    let mut patched = 0;
    for route in schedule.routes_mut() {
        if !substrings.iter().any(|s| route.id.contains(s.as_str())) {
            continue;
        }
        if let Some(transport_mode) = route.transport_mode.as_mut() {
            log::debug!(
                "route '{}' transport mode '{transport_mode}' -> '{mode}'",
                route.id
            );
            *transport_mode = mode.to_string();
            patched += 1;
        }
    }
    patched
}

pub fn run(
    input_file: &str,
    output_file: &str,
    substrings: &[String],
    mode: &str,
) -> Result<(), TransitPrepError> {
    if substrings.is_empty() {
        return Err(TransitPrepError::InvalidUserInput(String::from(
            "at least one route id substring is required",
        )));
    }
    let mut schedule = TransitSchedule::read(input_file)?;
    let patched = patch_transport_mode(&mut schedule, substrings, mode);
    schedule.write(output_file, &ScheduleWriteOptions::default())?;
    log::info!("set transport mode '{mode}' on {patched} routes, written to {output_file}");
    Ok(())
}
