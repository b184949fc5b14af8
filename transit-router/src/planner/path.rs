//! Path reconstruction and path costing.

use std::collections::HashMap;

use crate::domain::{Stop, StopId};
use crate::graph::Graph;

/// Walk a predecessor map from `dest` back to `start`.
///
/// Returns the stops in travel order, or an empty path when `dest` has no
/// predecessor chain leading to `start`. `start == dest` is the single-stop
/// path.
pub fn reconstruct_path<'g>(
    graph: &'g Graph,
    previous: &HashMap<StopId, StopId>,
    start: StopId,
    dest: StopId,
) -> Vec<&'g Stop> {
    let mut ids = vec![dest];
    let mut current = dest;

    while current != start {
        let Some(&prev) = previous.get(&current) else {
            return Vec::new();
        };
        // A well-formed map never revisits a stop.
        if ids.len() > graph.len() {
            return Vec::new();
        }
        ids.push(prev);
        current = prev;
    }

    ids.iter().rev().filter_map(|&id| graph.stop(id)).collect()
}

/// Sum of the cheapest edge between each consecutive pair of stops.
///
/// Returns `None` if some consecutive pair has no connecting edge. An empty
/// or single-stop path costs nothing.
pub fn path_minutes(graph: &Graph, path: &[&Stop]) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, pair| {
        let leg = graph
            .edges_from(pair[0].id())
            .iter()
            .filter(|e| e.to() == pair[1].id())
            .map(|e| e.transit_time())
            .min_by(f64::total_cmp)?;
        Some(total + leg)
    })
}
