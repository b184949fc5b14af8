//! Floyd-Warshall all-pairs shortest paths.
//!
//! Builds dense V×V cost and next-hop matrices, O(V²) memory and O(V³)
//! time. [`AllPairs`] can be kept and queried repeatedly; the
//! [`floyd_warshall`] function recomputes it for a single pair so that its
//! metrics are comparable with the single-source algorithms.

use std::time::Instant;

use tracing::debug;

use crate::domain::{Stop, StopId};
use crate::graph::Graph;

use super::search::{Algorithm, SearchOutcome};

/// All-pairs costs and next hops, indexed by stop insertion order.
#[derive(Debug, Clone)]
pub struct AllPairs {
    n: usize,
    cost: Vec<f64>,
    next: Vec<Option<usize>>,
}

impl AllPairs {
    /// Run Floyd-Warshall over the whole graph.
    ///
    /// Parallel edges between the same pair keep the cheapest.
    pub fn compute(graph: &Graph) -> Self {
        let n = graph.len();
        let mut cost = vec![f64::INFINITY; n * n];
        let mut next = vec![None; n * n];

        for i in 0..n {
            cost[i * n + i] = 0.0;
            next[i * n + i] = Some(i);
        }

        for (i, stop) in graph.stops().iter().enumerate() {
            for edge in graph.edges_from(stop.id()) {
                let Some(j) = graph.index_of(edge.to()) else {
                    continue;
                };
                if i != j && edge.transit_time() < cost[i * n + j] {
                    cost[i * n + j] = edge.transit_time();
                    next[i * n + j] = Some(j);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let via = cost[i * n + k];
                if via.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = via + cost[k * n + j];
                    if candidate < cost[i * n + j] {
                        cost[i * n + j] = candidate;
                        next[i * n + j] = next[i * n + k];
                    }
                }
            }
        }

        debug!(stops = n, "Computed all-pairs matrices");
        Self { n, cost, next }
    }

    /// Number of stops covered.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Minimum cost between two stops, `None` if unreachable or unknown.
    pub fn cost(&self, graph: &Graph, from: StopId, to: StopId) -> Option<f64> {
        let (i, j) = (graph.index_of(from)?, graph.index_of(to)?);
        let cost = self.cost[i * self.n + j];
        cost.is_finite().then_some(cost)
    }

    /// Minimum-cost path between two stops, empty if unreachable or unknown.
    ///
    /// `graph` must be the graph these matrices were computed from.
    pub fn path<'g>(&self, graph: &'g Graph, from: StopId, to: StopId) -> Vec<&'g Stop> {
        let (Some(mut i), Some(j)) = (graph.index_of(from), graph.index_of(to)) else {
            return Vec::new();
        };
        if self.next[i * self.n + j].is_none() {
            return Vec::new();
        }

        let stops = graph.stops();
        let mut path = vec![&stops[i]];
        while i != j {
            match self.next[i * self.n + j] {
                Some(hop) if path.len() <= self.n => {
                    i = hop;
                    path.push(&stops[i]);
                }
                _ => return Vec::new(),
            }
        }
        path
    }
}

/// Floyd-Warshall answering a single pair.
///
/// Nodes explored is reported as V³, the number of relaxation steps.
pub fn floyd_warshall(graph: &Graph, start: StopId, dest: StopId) -> SearchOutcome<'_> {
    let started = Instant::now();
    if !graph.contains(start) || !graph.contains(dest) {
        return SearchOutcome::unknown_endpoint();
    }

    let all_pairs = AllPairs::compute(graph);
    let path = all_pairs.path(graph, start, dest);
    let n = graph.len();

    SearchOutcome::finish(
        Algorithm::FloydWarshall,
        started,
        n * n * n,
        path,
        all_pairs.cost(graph, start, dest),
        None,
    )
}
