//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Edge, Stop};
use crate::planner::{AlgorithmSummary, ComparisonRow, Metrics, SearchOutcome};

/// Query for `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Algorithm name, e.g. "dijkstra" or "weighted-astar"
    pub algorithm: String,

    /// Start stop id
    pub from: u32,

    /// Destination stop id
    pub to: u32,

    /// Heuristic weight for weighted A*
    pub weight: Option<f64>,
}

/// Query for `GET /compare`.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub from: u32,
    pub to: u32,

    /// Timing repeats per algorithm (defaults to 1)
    pub repeats: Option<usize>,
}

/// A stop on a returned path.
#[derive(Debug, Serialize)]
pub struct PathStop {
    pub id: u32,
    pub name: String,
}

impl PathStop {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id().0,
            name: stop.name().to_string(),
        }
    }
}

/// An outgoing edge of a stop.
#[derive(Debug, Serialize)]
pub struct ConnectionResult {
    pub to: u32,

    /// Route id, or -1 for a transfer
    pub route_id: i64,

    pub minutes: f64,
}

impl ConnectionResult {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            to: edge.to().0,
            route_id: edge.kind().as_raw(),
            minutes: edge.transit_time(),
        }
    }
}

/// Response for `GET /stops/:id`.
#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub id: u32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub routes: Vec<u32>,
    pub connections: Vec<ConnectionResult>,
}

impl StopResponse {
    pub fn new(stop: &Stop, edges: &[Edge]) -> Self {
        let position = stop.position();
        Self {
            id: stop.id().0,
            name: stop.name().to_string(),
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
            routes: stop.route_ids().iter().map(|r| r.0).collect(),
            connections: edges.iter().map(ConnectionResult::from_edge).collect(),
        }
    }
}

/// Search diagnostics.
#[derive(Debug, Serialize)]
pub struct MetricsResult {
    pub algorithm: String,
    pub nodes_explored: usize,
    pub elapsed_ms: f64,
    pub path_length: usize,
    pub total_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl MetricsResult {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self {
            algorithm: metrics.algorithm.to_string(),
            nodes_explored: metrics.nodes_explored,
            elapsed_ms: metrics.elapsed.as_secs_f64() * 1000.0,
            path_length: metrics.path_length,
            total_cost: metrics.total_cost,
            weight: metrics.weight,
        }
    }
}

/// Response for `GET /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub from: u32,
    pub to: u32,
    pub path: Vec<PathStop>,

    /// `null` when the destination is unreachable
    pub cost: Option<f64>,

    /// `null` when a stop id is unknown
    pub metrics: Option<MetricsResult>,
}

impl SearchResponse {
    pub fn from_outcome(from: u32, to: u32, outcome: &SearchOutcome<'_>) -> Self {
        Self {
            from,
            to,
            path: outcome.path.iter().map(|s| PathStop::from_stop(s)).collect(),
            cost: outcome.cost,
            metrics: outcome.metrics.as_ref().map(MetricsResult::from_metrics),
        }
    }
}

/// One algorithm's row in a comparison.
#[derive(Debug, Serialize)]
pub struct ComparisonRowResult {
    pub algorithm: String,
    pub found: bool,
    pub cost: Option<f64>,
    pub minutes: Option<f64>,
    pub nodes_explored: usize,
    pub path_length: usize,
    pub mean_ms: f64,
    pub optimal: Option<bool>,
}

impl ComparisonRowResult {
    pub fn from_row(row: &ComparisonRow) -> Self {
        Self {
            algorithm: row.algorithm.to_string(),
            found: row.found,
            cost: row.cost,
            minutes: row.minutes,
            nodes_explored: row.nodes_explored,
            path_length: row.path_length,
            mean_ms: row.mean_elapsed.as_secs_f64() * 1000.0,
            optimal: row.optimal,
        }
    }
}

/// Per-algorithm aggregate in a comparison.
#[derive(Debug, Serialize)]
pub struct SummaryResult {
    pub algorithm: String,
    pub runs: usize,
    pub found: usize,
    pub optimal: usize,
    pub mean_nodes_explored: f64,
    pub mean_ms: f64,
}

impl SummaryResult {
    pub fn from_summary(summary: &AlgorithmSummary) -> Self {
        Self {
            algorithm: summary.algorithm.to_string(),
            runs: summary.runs,
            found: summary.found,
            optimal: summary.optimal,
            mean_nodes_explored: summary.mean_nodes_explored,
            mean_ms: summary.mean_elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Response for `GET /compare`.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub from: u32,
    pub to: u32,
    pub rows: Vec<ComparisonRowResult>,
    pub summaries: Vec<SummaryResult>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
