use std::path::{Path, PathBuf};

use kdam::tqdm;
use scenprep_core::document::{ScheduleWriteOptions, TransitSchedule};

use super::{DuplicateStopPolicy, MergeSummary, ScheduleMergeContext};
use crate::TransitPrepError;

/// expands the user input into an ordered list of schedule files. a single
/// directory argument is replaced by the `*.xml` / `*.xml.gz` files it
/// contains, sorted by file name.
pub fn collect_input_files(inputs: &[String]) -> Result<Vec<PathBuf>, TransitPrepError> {
    if inputs.is_empty() {
        return Err(TransitPrepError::InvalidUserInput(String::from(
            "at least one input schedule file or directory is required",
        )));
    }
    let mut files = vec![];
    for input in inputs.iter() {
        let path = Path::new(input);
        if path.is_dir() {
            files.extend(schedule_files_in_directory(path)?);
        } else if path.is_file() {
            files.push(path.to_owned());
        } else {
            return Err(TransitPrepError::InvalidUserInput(format!(
                "input '{input}' is not a file or directory"
            )));
        }
    }
    if files.is_empty() {
        return Err(TransitPrepError::InvalidUserInput(format!(
            "no schedule files found in [{}]",
            inputs.join(", ")
        )));
    }
    Ok(files)
}

fn schedule_files_in_directory(dir: &Path) -> Result<Vec<PathBuf>, TransitPrepError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        TransitPrepError::InvalidUserInput(format!(
            "unable to read directory '{}': {e}",
            dir.display()
        ))
    })?;
    let mut files = vec![];
    for entry in entries {
        let entry = entry.map_err(|e| {
            TransitPrepError::InvalidUserInput(format!(
                "unable to read entry in directory '{}': {e}",
                dir.display()
            ))
        })?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if path.is_file() && (name.ends_with(".xml") || name.ends_with(".xml.gz")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// reads and merges the schedule files in order.
pub fn merge_schedules(
    files: &[PathBuf],
    policy: DuplicateStopPolicy,
) -> Result<(TransitSchedule, MergeSummary), TransitPrepError> {
    let mut ctx = ScheduleMergeContext::new(policy);
    let iter = tqdm!(files.iter(), desc = "merging transit schedules");
    for file in iter {
        log::info!("reading transit schedule file: {}", file.display());
        let document = TransitSchedule::read(file)?;
        ctx.add_document(document);
    }
    eprintln!();
    Ok(ctx.finish())
}

pub fn run(
    inputs: &[String],
    output_file: &str,
    policy: DuplicateStopPolicy,
) -> Result<(), TransitPrepError> {
    let files = collect_input_files(inputs)?;
    log::info!(
        "merging {} transit schedule files with duplicate stop policy '{policy}'",
        files.len()
    );
    let (merged, summary) = merge_schedules(&files, policy)?;
    merged.write(output_file, &ScheduleWriteOptions::default())?;
    log::info!(
        "merged schedule written to {output_file}: {} stops ({} renamed, {} skipped), {} lines, {} routes ({} duplicate routes dropped)",
        summary.stops,
        summary.renamed_stops,
        summary.skipped_stops,
        summary.lines,
        summary.routes,
        summary.dropped_routes
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const FIRST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<transitSchedule>
    <transitStops>
        <stopFacility id="S1" x="135.1" y="35.0"/>
        <stopFacility id="S2" x="135.2" y="35.0"/>
    </transitStops>
    <transitLine id="L1">
        <transitRoute id="R1">
            <transportMode>bus</transportMode>
            <routeProfile>
                <stop refId="S1" departureOffset="00:00:00"/>
                <stop refId="S2" arrivalOffset="00:05:00"/>
            </routeProfile>
            <departures/>
        </transitRoute>
    </transitLine>
</transitSchedule>"#;

    const SECOND: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<transitSchedule>
    <transitStops>
        <stopFacility id="S1" x="136.0" y="35.5"/>
    </transitStops>
    <transitLines>
        <transitLine id="L1">
            <transitRoute id="R2">
                <transportMode>bus</transportMode>
                <routeProfile>
                    <stop refId="S1" departureOffset="00:00:00"/>
                    <stop refId="S1" arrivalOffset="00:30:00"/>
                </routeProfile>
                <departures/>
            </transitRoute>
        </transitLine>
    </transitLines>
</transitSchedule>"#;

    #[test]
    fn test_merge_directory_end_to_end() {
        let dir = std::env::temp_dir().join("scenprep-transit-merge-test");
        let input_dir = dir.join("inputs");
        std::fs::create_dir_all(&input_dir).expect("create test dir");
        std::fs::write(input_dir.join("a.xml"), FIRST).expect("write a");
        std::fs::write(input_dir.join("b.xml"), SECOND).expect("write b");
        std::fs::write(input_dir.join("notes.txt"), "ignored").expect("write notes");
        let output = dir.join("merged.xml");

        let inputs = vec![input_dir.to_string_lossy().to_string()];
        run(
            &inputs,
            &output.to_string_lossy(),
            DuplicateStopPolicy::Rename,
        )
        .expect("merge succeeds");

        let merged = TransitSchedule::read(&output).expect("read merged");
        let ids = merged.stops.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["S1", "S2", "S1+1"]);
        assert_eq!(merged.lines.len(), 1);
        let l1 = merged.line("L1").expect("L1 present");
        assert_eq!(l1.routes.len(), 2);
        assert!(l1.routes[1].profile.iter().all(|s| s.ref_id == "S1+1"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_input_is_invalid() {
        let inputs = vec![String::from("/definitely/not/a/schedule.xml")];
        let result = collect_input_files(&inputs);
        assert!(matches!(result, Err(TransitPrepError::InvalidUserInput(_))));
        assert!(matches!(
            collect_input_files(&[]),
            Err(TransitPrepError::InvalidUserInput(_))
        ));
    }
}
