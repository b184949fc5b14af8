//! A* and weighted A*.
//!
//! Both order the frontier by `g + w * h`, where `g` is the accumulated cost
//! and `h` is the straight-line distance to the destination converted to
//! minutes at the heuristic speed. With `w = 1` and no segment faster than
//! that speed the heuristic is admissible (and consistent) and the result is
//! optimal. Larger weights explore fewer stops but may return a costlier
//! path.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::trace;

use crate::domain::{Coordinate, StopId};
use crate::graph::Graph;

use super::frontier::Frontier;
use super::path::reconstruct_path;
use super::search::{Algorithm, SearchOutcome};

/// Optimal A* search.
pub fn astar(graph: &Graph, start: StopId, dest: StopId, speed_kmh: f64) -> SearchOutcome<'_> {
    guided(graph, start, dest, speed_kmh, 1.0, Algorithm::AStar)
}

/// A* with the heuristic scaled by `weight` (expected to be >= 1).
pub fn weighted_astar(
    graph: &Graph,
    start: StopId,
    dest: StopId,
    speed_kmh: f64,
    weight: f64,
) -> SearchOutcome<'_> {
    guided(graph, start, dest, speed_kmh, weight, Algorithm::WeightedAStar)
}

/// Straight-line time estimate to a fixed destination.
struct Heuristic {
    target: Option<Coordinate>,
    minutes_per_km: f64,
}

impl Heuristic {
    fn new(target: Option<Coordinate>, speed_kmh: f64, weight: f64) -> Self {
        Self {
            target,
            minutes_per_km: 60.0 / speed_kmh * weight,
        }
    }

    /// Zero when either position is unknown.
    fn estimate(&self, from: Option<Coordinate>) -> f64 {
        match (from, self.target) {
            (Some(from), Some(target)) => from.haversine_km(&target) * self.minutes_per_km,
            _ => 0.0,
        }
    }
}

fn guided(
    graph: &Graph,
    start: StopId,
    dest: StopId,
    speed_kmh: f64,
    weight: f64,
    algorithm: Algorithm,
) -> SearchOutcome<'_> {
    let started = Instant::now();
    let Some(target) = graph.stop(dest) else {
        return SearchOutcome::unknown_endpoint();
    };
    if !graph.contains(start) {
        return SearchOutcome::unknown_endpoint();
    }

    let heuristic = Heuristic::new(target.position(), speed_kmh, weight);
    let estimate = |id: StopId| heuristic.estimate(graph.stop(id).and_then(|s| s.position()));

    let mut g_score: HashMap<StopId, f64> = HashMap::from([(start, 0.0)]);
    let mut previous: HashMap<StopId, StopId> = HashMap::new();
    let mut closed: HashSet<StopId> = HashSet::new();
    let mut frontier = Frontier::new();
    frontier.push(start, estimate(start));

    while let Some((current, priority)) = frontier.pop() {
        if !closed.insert(current) {
            continue;
        }
        trace!(stop = %current, priority, "A* expanding stop");

        if current == dest {
            break;
        }

        let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);
        for edge in graph.edges_from(current) {
            let next = edge.to();
            if closed.contains(&next) {
                continue;
            }
            let candidate = current_g + edge.transit_time();
            if g_score.get(&next).is_none_or(|&known| candidate < known) {
                g_score.insert(next, candidate);
                previous.insert(next, current);
                frontier.push(next, candidate + estimate(next));
            }
        }
    }

    let path = reconstruct_path(graph, &previous, start, dest);
    let weight = (algorithm == Algorithm::WeightedAStar).then_some(weight);
    SearchOutcome::finish(
        algorithm,
        started,
        closed.len(),
        path,
        g_score.get(&dest).copied(),
        weight,
    )
}
