//! Breadth-first search baseline.
//!
//! Finds the path with the fewest edges, ignoring weights. The reported cost
//! is that path's hop count, so it is only comparable with the weighted
//! algorithms by summing the path's edge weights separately (see
//! [`path_minutes`](super::path_minutes)).

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use tracing::trace;

use crate::domain::StopId;
use crate::graph::Graph;

use super::path::reconstruct_path;
use super::search::{Algorithm, SearchOutcome};

/// Fewest-hops path from `start` to `dest`.
///
/// Each stop is assigned a predecessor when first discovered. Neighbors are
/// discovered in adjacency order. The search stops once `dest` is
/// discovered.
pub fn bfs(graph: &Graph, start: StopId, dest: StopId) -> SearchOutcome<'_> {
    let started = Instant::now();
    if !graph.contains(start) || !graph.contains(dest) {
        return SearchOutcome::unknown_endpoint();
    }

    let mut previous: HashMap<StopId, StopId> = HashMap::new();
    let mut discovered: HashSet<StopId> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    'search: while let Some(current) = queue.pop_front() {
        if current == dest {
            break;
        }
        trace!(stop = %current, "BFS exploring stop");

        for edge in graph.edges_from(current) {
            let next = edge.to();
            if discovered.insert(next) {
                previous.insert(next, current);
                if next == dest {
                    break 'search;
                }
                queue.push_back(next);
            }
        }
    }

    let path = reconstruct_path(graph, &previous, start, dest);
    let hops = path.len().checked_sub(1).map(|h| h as f64);
    SearchOutcome::finish(Algorithm::Bfs, started, discovered.len(), path, hops, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, RouteId, Stop};

    fn graph(n: u32, edges: &[(u32, u32, f64)]) -> Graph {
        Graph::from_parts(
            (1..=n).map(|i| Stop::new(StopId(i), format!("Stop {i}")).with_route(RouteId(1))),
            edges
                .iter()
                .map(|&(a, b, w)| Edge::route(StopId(a), StopId(b), RouteId(1), w)),
        )
        .unwrap()
    }

    #[test]
    fn fewest_hops_not_cheapest() {
        // Direct edge is expensive, the detour cheap.
        let g = graph(3, &[(1, 3, 50.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let outcome = bfs(&g, StopId(1), StopId(3));

        assert_eq!(outcome.stop_ids(), vec![StopId(1), StopId(3)]);
        assert_eq!(outcome.cost, Some(1.0));
    }

    #[test]
    fn start_is_destination() {
        let g = graph(2, &[(1, 2, 1.0)]);
        let outcome = bfs(&g, StopId(2), StopId(2));

        assert_eq!(outcome.stop_ids(), vec![StopId(2)]);
        assert_eq!(outcome.cost, Some(0.0));
        assert_eq!(outcome.metrics.unwrap().nodes_explored, 1);
    }

    #[test]
    fn counts_discovered_stops() {
        let g = graph(5, &[(1, 2, 1.0), (1, 3, 1.0), (2, 4, 1.0), (4, 5, 1.0)]);
        let outcome = bfs(&g, StopId(1), StopId(4));

        assert_eq!(outcome.cost, Some(2.0));
        // 1, then 2 and 3, then 4.
        assert_eq!(outcome.metrics.unwrap().nodes_explored, 4);
    }

    #[test]
    fn unreachable() {
        let g = graph(3, &[(1, 2, 1.0)]);
        let outcome = bfs(&g, StopId(1), StopId(3));
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.cost, None);
        assert_eq!(outcome.metrics.unwrap().nodes_explored, 2);
    }
}
