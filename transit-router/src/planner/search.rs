//! The query interface over a built graph.
//!
//! [`Planner`] dispatches a search by algorithm name and wraps the result in
//! a common [`SearchOutcome`]: the path, its cost, and execution metrics.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::{Stop, StopId};
use crate::graph::Graph;

use super::config::SearchConfig;
use super::{astar, bfs, dijkstra, floyd};

/// Error from a search request.
///
/// Unknown stops and unreachable destinations are not errors; they are
/// represented in the [`SearchOutcome`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// Algorithm name not recognized
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Weighted A* weight below 1 or not finite
    #[error("invalid heuristic weight {0}: must be a finite number >= 1")]
    InvalidWeight(f64),

    /// A* heuristic speed not positive or not finite
    #[error("invalid heuristic speed {0} km/h: must be a finite number > 0")]
    InvalidHeuristicSpeed(f64),
}

/// The available search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Dijkstra,
    FloydWarshall,
    AStar,
    WeightedAStar,
    Bfs,
}

impl Algorithm {
    /// Every algorithm, in comparison order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Dijkstra,
        Algorithm::FloydWarshall,
        Algorithm::AStar,
        Algorithm::WeightedAStar,
        Algorithm::Bfs,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::FloydWarshall => "Floyd-Warshall",
            Algorithm::AStar => "A*",
            Algorithm::WeightedAStar => "Weighted A*",
            Algorithm::Bfs => "BFS",
        }
    }

    /// Whether the reported cost is a time in minutes.
    ///
    /// BFS reports a hop count instead.
    pub fn is_weighted(&self) -> bool {
        !matches!(self, Algorithm::Bfs)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    /// Parse an algorithm name. Case, spaces, dashes and underscores are
    /// ignored, so "Floyd-Warshall", "floyd_warshall" and "floydwarshall"
    /// are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "floydwarshall" | "fw" => Ok(Algorithm::FloydWarshall),
            "astar" | "a*" => Ok(Algorithm::AStar),
            "weightedastar" | "weighteda*" | "wastar" => Ok(Algorithm::WeightedAStar),
            "bfs" | "breadthfirst" => Ok(Algorithm::Bfs),
            _ => Err(SearchError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Per-query diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub algorithm: Algorithm,

    /// Stops finalized (or discovered, for BFS). Floyd-Warshall reports the
    /// n³ relaxation count.
    pub nodes_explored: usize,

    pub elapsed: Duration,

    /// Number of stops on the returned path.
    pub path_length: usize,

    /// Same as [`SearchOutcome::cost`].
    pub total_cost: Option<f64>,

    /// Heuristic weight, for weighted A*.
    pub weight: Option<f64>,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome<'g> {
    /// Stops from start to destination; empty when there is no path.
    pub path: Vec<&'g Stop>,

    /// Total cost, or `None` when the destination is unreachable.
    pub cost: Option<f64>,

    /// `None` when an endpoint id is not in the graph; populated (even with
    /// zero exploration) otherwise.
    pub metrics: Option<Metrics>,
}

impl<'g> SearchOutcome<'g> {
    /// Outcome for a query naming a stop the graph doesn't have.
    pub fn unknown_endpoint() -> Self {
        Self {
            path: Vec::new(),
            cost: None,
            metrics: None,
        }
    }

    pub(crate) fn finish(
        algorithm: Algorithm,
        started: Instant,
        nodes_explored: usize,
        path: Vec<&'g Stop>,
        cost: Option<f64>,
        weight: Option<f64>,
    ) -> Self {
        let cost = if path.is_empty() { None } else { cost };
        let metrics = Metrics {
            algorithm,
            nodes_explored,
            elapsed: started.elapsed(),
            path_length: path.len(),
            total_cost: cost,
            weight,
        };
        Self {
            path,
            cost,
            metrics: Some(metrics),
        }
    }

    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn stop_ids(&self) -> Vec<StopId> {
        self.path.iter().map(|s| s.id()).collect()
    }
}

/// Runs searches against a shared, read-only graph.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'g> {
    graph: &'g Graph,
    config: &'g SearchConfig,
}

impl<'g> Planner<'g> {
    /// Create a new planner.
    pub fn new(graph: &'g Graph, config: &'g SearchConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn config(&self) -> &'g SearchConfig {
        self.config
    }

    pub fn stop_by_id(&self, id: StopId) -> Option<&'g Stop> {
        self.graph.stop(id)
    }

    /// Search by algorithm name.
    ///
    /// `weight` only affects weighted A*, which falls back to the configured
    /// default when none is given.
    pub fn search(
        &self,
        algorithm: &str,
        start: StopId,
        dest: StopId,
        weight: Option<f64>,
    ) -> Result<SearchOutcome<'g>, SearchError> {
        self.run(algorithm.parse()?, start, dest, weight)
    }

    /// Search with a specific algorithm.
    pub fn run(
        &self,
        algorithm: Algorithm,
        start: StopId,
        dest: StopId,
        weight: Option<f64>,
    ) -> Result<SearchOutcome<'g>, SearchError> {
        let graph = self.graph;
        let speed = self.config.heuristic_speed_kmh;
        if matches!(algorithm, Algorithm::AStar | Algorithm::WeightedAStar)
            && !self.config.has_valid_speed()
        {
            return Err(SearchError::InvalidHeuristicSpeed(speed));
        }

        let outcome = match algorithm {
            Algorithm::Dijkstra => dijkstra::dijkstra(graph, start, dest),
            Algorithm::FloydWarshall => floyd::floyd_warshall(graph, start, dest),
            Algorithm::AStar => astar::astar(graph, start, dest, speed),
            Algorithm::WeightedAStar => {
                let weight = weight.unwrap_or(self.config.default_weight);
                if !weight.is_finite() || weight < 1.0 {
                    return Err(SearchError::InvalidWeight(weight));
                }
                astar::weighted_astar(graph, start, dest, speed, weight)
            }
            Algorithm::Bfs => bfs::bfs(graph, start, dest),
        };

        match &outcome.metrics {
            Some(m) => debug!(
                %algorithm,
                from = %start,
                to = %dest,
                nodes = m.nodes_explored,
                path_length = m.path_length,
                cost = ?m.total_cost,
                elapsed_us = m.elapsed.as_micros() as u64,
                "Search finished"
            ),
            None => debug!(%algorithm, from = %start, to = %dest, "Unknown endpoint"),
        }

        Ok(outcome)
    }
}
