//! Dijkstra's single-source shortest path.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::trace;

use crate::domain::StopId;
use crate::graph::Graph;

use super::frontier::Frontier;
use super::path::reconstruct_path;
use super::search::{Algorithm, SearchOutcome};

/// Minimum-cost path from `start` to `dest`.
///
/// Costs are initialized lazily; a stop absent from the cost map has not
/// been reached. The search stops as soon as `dest` is finalized.
pub fn dijkstra(graph: &Graph, start: StopId, dest: StopId) -> SearchOutcome<'_> {
    let started = Instant::now();
    if !graph.contains(start) || !graph.contains(dest) {
        return SearchOutcome::unknown_endpoint();
    }

    let mut cost: HashMap<StopId, f64> = HashMap::from([(start, 0.0)]);
    let mut previous: HashMap<StopId, StopId> = HashMap::new();
    let mut finalized: HashSet<StopId> = HashSet::new();
    let mut frontier = Frontier::new();
    frontier.push(start, 0.0);

    while let Some((current, current_cost)) = frontier.pop() {
        if !finalized.insert(current) {
            continue;
        }
        trace!(stop = %current, cost = current_cost, "Dijkstra finalizing stop");

        if current == dest {
            break;
        }

        for edge in graph.edges_from(current) {
            let next = edge.to();
            if finalized.contains(&next) {
                continue;
            }
            let candidate = current_cost + edge.transit_time();
            if cost.get(&next).is_none_or(|&known| candidate < known) {
                cost.insert(next, candidate);
                previous.insert(next, current);
                frontier.push(next, candidate);
            }
        }
    }

    let path = reconstruct_path(graph, &previous, start, dest);
    SearchOutcome::finish(
        Algorithm::Dijkstra,
        started,
        finalized.len(),
        path,
        cost.get(&dest).copied(),
        None,
    )
}
