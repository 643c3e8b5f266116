use std::collections::{HashMap, HashSet};

use scenprep_core::document::{
    MinimalTransferTime, StopFacility, TransitLine, TransitRoute, TransitSchedule,
};

use super::DuplicateStopPolicy;

/// counts reported once a merge completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub documents: usize,
    pub stops: usize,
    pub renamed_stops: usize,
    pub skipped_stops: usize,
    pub lines: usize,
    pub routes: usize,
    pub dropped_routes: usize,
}

/// accumulates schedule documents into a single merged document.
///
/// documents are added one at a time. stops are merged first, building a
/// rename map for the incoming document, and that map is applied to the
/// document's route profiles before its lines are merged, so every route
/// keeps pointing at the stop it referenced in its source document. minimal
/// transfer times follow the same renames.
pub struct ScheduleMergeContext {
    policy: DuplicateStopPolicy,
    merged: TransitSchedule,
    stop_ids: HashSet<String>,
    transfer_pairs: HashSet<(String, String)>,
    line_index: HashMap<String, usize>,
    route_ids: Vec<HashSet<String>>,
    summary: MergeSummary,
}

impl ScheduleMergeContext {
    pub fn new(policy: DuplicateStopPolicy) -> ScheduleMergeContext {
        ScheduleMergeContext {
            policy,
            merged: TransitSchedule::default(),
            stop_ids: HashSet::new(),
            transfer_pairs: HashSet::new(),
            line_index: HashMap::new(),
            route_ids: vec![],
            summary: MergeSummary::default(),
        }
    }

    /// merges one document into the context. returns the stop rename map
    /// that was applied to this document (original id -> merged id).
    pub fn add_document(&mut self, document: TransitSchedule) -> HashMap<String, String> {
        let TransitSchedule {
            attributes,
            stops,
            mut minimal_transfer_times,
            mut lines,
            extra_elements,
        } = document;
        if self.merged.attributes.is_empty() && !attributes.is_empty() {
            self.merged.attributes = attributes;
        }
        let renames = self.merge_stops(stops);
        if !renames.is_empty() {
            apply_renames(&mut lines, &renames);
            rename_transfer_stops(&mut minimal_transfer_times, &renames);
        }
        self.merge_transfer_times(minimal_transfer_times);
        self.merge_lines(lines);
        for fragment in extra_elements.into_iter() {
            if !self.merged.extra_elements.contains(&fragment) {
                self.merged.extra_elements.push(fragment);
            }
        }
        self.summary.documents += 1;
        renames
    }

    pub fn summary(&self) -> MergeSummary {
        let mut summary = self.summary;
        summary.stops = self.merged.stops.len();
        summary.lines = self.merged.lines.len();
        summary.routes = self.merged.lines.iter().map(|l| l.routes.len()).sum();
        summary
    }

    pub fn finish(self) -> (TransitSchedule, MergeSummary) {
        let summary = self.summary();
        (self.merged, summary)
    }

    fn merge_stops(&mut self, stops: Vec<StopFacility>) -> HashMap<String, String> {
        let mut renames = HashMap::new();
        let mut document_ids: HashSet<String> = HashSet::new();
        for mut stop in stops.into_iter() {
            if !self.stop_ids.contains(&stop.id) {
                self.stop_ids.insert(stop.id.clone());
                document_ids.insert(stop.id.clone());
                self.merged.stops.push(stop);
                continue;
            }
            match self.policy {
                DuplicateStopPolicy::Skip => {
                    log::debug!("skipping duplicate stop facility '{}'", stop.id);
                    self.summary.skipped_stops += 1;
                }
                DuplicateStopPolicy::Rename => {
                    let new_id = self.next_free_id(&stop.id);
                    if document_ids.contains(&stop.id) {
                        // repeated within its own document: references keep the first one
                        log::warn!(
                            "stop facility '{}' repeats within one document, renamed to '{new_id}'",
                            stop.id
                        );
                    } else {
                        log::debug!("renaming stop facility '{}' to '{new_id}'", stop.id);
                        renames.entry(stop.id.clone()).or_insert(new_id.clone());
                    }
                    stop.id = new_id.clone();
                    self.stop_ids.insert(new_id.clone());
                    document_ids.insert(new_id);
                    self.merged.stops.push(stop);
                    self.summary.renamed_stops += 1;
                }
            }
        }
        renames
    }

    fn next_free_id(&self, id: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{id}+{n}");
            if !self.stop_ids.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// the first relation between two stops wins.
    fn merge_transfer_times(&mut self, relations: Vec<MinimalTransferTime>) {
        for relation in relations.into_iter() {
            let key = (relation.from_stop.clone(), relation.to_stop.clone());
            if self.transfer_pairs.insert(key) {
                self.merged.minimal_transfer_times.push(relation);
            } else {
                log::debug!(
                    "dropping duplicate minimal transfer time '{}' -> '{}'",
                    relation.from_stop,
                    relation.to_stop
                );
            }
        }
    }

    fn merge_lines(&mut self, lines: Vec<TransitLine>) {
        for mut line in lines.into_iter() {
            if let Some(&index) = self.line_index.get(&line.id) {
                self.merge_routes(index, line.routes);
                continue;
            }
            let index = self.merged.lines.len();
            self.line_index.insert(line.id.clone(), index);
            self.route_ids.push(HashSet::new());
            let routes = std::mem::take(&mut line.routes);
            self.merged.lines.push(line);
            self.merge_routes(index, routes);
        }
    }

    fn merge_routes(&mut self, index: usize, routes: Vec<TransitRoute>) {
        let line = &mut self.merged.lines[index];
        let known = &mut self.route_ids[index];
        for route in routes.into_iter() {
            if known.contains(&route.id) {
                log::debug!(
                    "dropping route '{}' of line '{}', the route id is already present",
                    route.id,
                    line.id
                );
                self.summary.dropped_routes += 1;
                continue;
            }
            known.insert(route.id.clone());
            line.routes.push(route);
        }
    }
}

/// rewrites route profile stop references through a rename map.
fn apply_renames(lines: &mut [TransitLine], renames: &HashMap<String, String>) {
    for route in lines.iter_mut().flat_map(|l| l.routes.iter_mut()) {
        for stop in route.profile.iter_mut() {
            if let Some(renamed) = renames.get(&stop.ref_id) {
                stop.ref_id = renamed.clone();
            }
        }
    }
}

fn rename_transfer_stops(
    relations: &mut [MinimalTransferTime],
    renames: &HashMap<String, String>,
) {
    for relation in relations.iter_mut() {
        if let Some(renamed) = renames.get(&relation.from_stop) {
            relation.from_stop = renamed.clone();
        }
        if let Some(renamed) = renames.get(&relation.to_stop) {
            relation.to_stop = renamed.clone();
        }
    }
}
