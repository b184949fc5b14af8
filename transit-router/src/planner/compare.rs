//! Side-by-side algorithm comparison.
//!
//! Runs every algorithm over a set of named scenarios, timing each one over
//! several repeats, and checks the returned path's travel time against
//! Dijkstra's optimum.

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::StopId;

use super::path::path_minutes;
use super::search::{Algorithm, Planner};

/// Tolerance when comparing a path's time with the optimum.
const COST_EPSILON: f64 = 1e-6;

/// A named origin/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    /// Free-form grouping such as "Short distance" or "Cross-route".
    pub category: String,
    pub from: StopId,
    pub to: StopId,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        from: StopId,
        to: StopId,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            from,
            to,
        }
    }
}

/// One algorithm on one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub scenario: String,
    pub category: String,
    pub algorithm: Algorithm,
    pub found: bool,
    /// The algorithm's own cost (hops, for BFS).
    pub cost: Option<f64>,
    /// Travel time along the returned path.
    pub minutes: Option<f64>,
    pub nodes_explored: usize,
    pub path_length: usize,
    pub mean_elapsed: Duration,
    pub min_elapsed: Duration,
    pub max_elapsed: Duration,
    /// Whether `minutes` matches Dijkstra's cost. `None` when Dijkstra found
    /// no path.
    pub optimal: Option<bool>,
}

/// Aggregate over all scenarios for one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub algorithm: Algorithm,
    pub runs: usize,
    pub found: usize,
    pub optimal: usize,
    pub mean_nodes_explored: f64,
    pub mean_path_length: f64,
    pub mean_elapsed: Duration,
}

/// Rows in scenario order, then summaries in [`Algorithm::ALL`] order.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    pub summaries: Vec<AlgorithmSummary>,
}

/// Run every algorithm on every scenario, `repeats` times each (at least
/// once). Path, cost and exploration come from the first run; timings
/// cover all of them.
pub fn compare(planner: &Planner<'_>, scenarios: &[Scenario], repeats: usize) -> Comparison {
    let repeats = repeats.max(1);
    let graph = planner.graph();
    let mut rows = Vec::with_capacity(scenarios.len() * Algorithm::ALL.len());

    for scenario in scenarios {
        let mut optimum = None;

        for algorithm in Algorithm::ALL {
            let mut timings = Vec::with_capacity(repeats);
            let mut first = None;

            for _ in 0..repeats {
                let outcome = match planner.run(algorithm, scenario.from, scenario.to, None) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(%algorithm, scenario = %scenario.name, error = %e, "Skipping algorithm");
                        break;
                    }
                };
                timings.push(outcome.metrics.as_ref().map(|m| m.elapsed).unwrap_or_default());
                if first.is_none() {
                    first = Some(outcome);
                }
            }

            let Some(outcome) = first else { continue };
            let minutes = outcome
                .is_found()
                .then(|| path_minutes(graph, &outcome.path))
                .flatten();
            if algorithm == Algorithm::Dijkstra {
                optimum = outcome.cost;
            }
            let optimal = optimum.map(|best| {
                minutes.is_some_and(|m| (m - best).abs() <= COST_EPSILON)
            });

            let metrics = outcome.metrics.as_ref();
            rows.push(ComparisonRow {
                scenario: scenario.name.clone(),
                category: scenario.category.clone(),
                algorithm,
                found: outcome.is_found(),
                cost: outcome.cost,
                minutes,
                nodes_explored: metrics.map_or(0, |m| m.nodes_explored),
                path_length: outcome.path.len(),
                mean_elapsed: mean_duration(&timings),
                min_elapsed: timings.iter().min().copied().unwrap_or_default(),
                max_elapsed: timings.iter().max().copied().unwrap_or_default(),
                optimal,
            });
        }
    }

    let summaries: Vec<AlgorithmSummary> = Algorithm::ALL
        .into_iter()
        .filter_map(|algorithm| summarize(algorithm, &rows))
        .collect();

    for summary in &summaries {
        info!(
            algorithm = %summary.algorithm,
            runs = summary.runs,
            found = summary.found,
            optimal = summary.optimal,
            mean_nodes = summary.mean_nodes_explored,
            mean_us = summary.mean_elapsed.as_micros() as u64,
            "Comparison summary"
        );
    }

    Comparison { rows, summaries }
}

fn summarize(algorithm: Algorithm, rows: &[ComparisonRow]) -> Option<AlgorithmSummary> {
    let rows: Vec<&ComparisonRow> = rows.iter().filter(|r| r.algorithm == algorithm).collect();
    if rows.is_empty() {
        return None;
    }
    let runs = rows.len();
    let timings: Vec<Duration> = rows.iter().map(|r| r.mean_elapsed).collect();

    Some(AlgorithmSummary {
        algorithm,
        runs,
        found: rows.iter().filter(|r| r.found).count(),
        optimal: rows.iter().filter(|r| r.optimal == Some(true)).count(),
        mean_nodes_explored: rows.iter().map(|r| r.nodes_explored as f64).sum::<f64>()
            / runs as f64,
        mean_path_length: rows.iter().map(|r| r.path_length as f64).sum::<f64>() / runs as f64,
        mean_elapsed: mean_duration(&timings),
    })
}

fn mean_duration(timings: &[Duration]) -> Duration {
    if timings.is_empty() {
        return Duration::ZERO;
    }
    timings.iter().sum::<Duration>() / timings.len() as u32
}
