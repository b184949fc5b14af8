//! Edge cost model and the graph repair pass.
//!
//! Route segments are estimated from great-circle distance at the average
//! speed of the route's class, plus a dwell time. Transfers cost a fixed
//! penalty. This runs as a maintenance pass over an exclusively owned graph;
//! the search algorithms only ever read the resulting weights.

mod config;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::domain::{Coordinate, Edge, EdgeKind, RouteId};
use crate::graph::{Graph, GraphError};

pub use config::{CostConfig, RouteClass};

/// Count and mean weight of one kind of edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeStats {
    pub count: usize,
    pub mean_minutes: f64,
}

/// What a repair pass changed.
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    /// Transfer edges removed because their endpoints share a route.
    pub invalid_transfers_removed: usize,
    /// Route edges whose time was recomputed.
    pub route_edges_updated: usize,
    /// Route edges left untouched because an endpoint has no position.
    pub unresolved_skipped: usize,
    /// Transfer edges set to the penalty.
    pub transfers_updated: usize,
    /// Edge statistics after the repair, by kind.
    pub stats: BTreeMap<EdgeKind, EdgeStats>,
}

/// Estimates edge weights from geography and route class.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    config: CostConfig,
}

impl CostModel {
    pub fn new(config: CostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Estimated minutes to ride `route` between two positions.
    ///
    /// ```
    /// use transit_router::cost::CostModel;
    /// use transit_router::domain::{Coordinate, RouteId};
    ///
    /// let model = CostModel::default();
    /// let here = Coordinate::new(44.97, -93.26);
    /// // Distance zero: dwell only, floored at the minimum.
    /// assert_eq!(model.segment_minutes(RouteId(901), &here, &here), 1.0);
    /// ```
    pub fn segment_minutes(&self, route: RouteId, from: &Coordinate, to: &Coordinate) -> f64 {
        let speed = self.config.speed_kmh(self.config.class_of(route));
        let minutes = from.haversine_km(to) / speed * 60.0 + self.config.dwell_minutes;
        round_tenth(minutes).max(self.config.min_segment_minutes)
    }

    /// Estimated weight of an edge, or `None` when a route edge's endpoints
    /// are not both resolved.
    pub fn edge_minutes(&self, edge: &Edge, graph: &Graph) -> Option<f64> {
        match edge.kind() {
            EdgeKind::Transfer => Some(self.config.transfer_penalty),
            EdgeKind::Route(route) => {
                let from = graph.stop(edge.from())?.position()?;
                let to = graph.stop(edge.to())?.position()?;
                Some(self.segment_minutes(route, &from, &to))
            }
        }
    }

    /// Set every transfer edge to the penalty. Returns the number changed.
    pub fn apply_transfer_penalty(&self, graph: &mut Graph) -> usize {
        let penalty = self.config.transfer_penalty;
        let mut count = 0;
        for edge in graph.edges_mut().filter(|e| e.is_transfer()) {
            edge.set_transit_time(penalty);
            count += 1;
        }
        count
    }

    /// Repair a built graph.
    ///
    /// 1. Remove transfer edges whose endpoints share a route.
    /// 2. Recompute every route edge from distance and route class.
    /// 3. Charge the transfer penalty on every remaining transfer edge.
    ///
    /// The configuration is checked before the graph is touched, so an
    /// error leaves the graph as it was. The graph is re-validated before
    /// returning.
    pub fn repair(&self, graph: &mut Graph) -> Result<RepairReport, GraphError> {
        self.config.validate()?;

        let mut report = RepairReport {
            invalid_transfers_removed: graph.retain_edges(|g, e| {
                if !e.is_transfer() {
                    return true;
                }
                match (g.stop(e.from()), g.stop(e.to())) {
                    (Some(a), Some(b)) => !a.shares_route_with(b),
                    _ => true,
                }
            }),
            ..RepairReport::default()
        };

        let positions: HashMap<_, _> = graph
            .stops()
            .iter()
            .filter_map(|s| s.position().map(|p| (s.id(), p)))
            .collect();

        for edge in graph.edges_mut() {
            match edge.kind() {
                EdgeKind::Transfer => {
                    edge.set_transit_time(self.config.transfer_penalty);
                    report.transfers_updated += 1;
                }
                EdgeKind::Route(route) => {
                    match (positions.get(&edge.from()), positions.get(&edge.to())) {
                        (Some(from), Some(to)) => {
                            edge.set_transit_time(self.segment_minutes(route, from, to));
                            report.route_edges_updated += 1;
                        }
                        _ => {
                            debug!(from = %edge.from(), to = %edge.to(), "Unresolved endpoint, keeping weight");
                            report.unresolved_skipped += 1;
                        }
                    }
                }
            }
        }

        graph.validate()?;
        report.stats = edge_statistics(graph);

        info!(
            removed = report.invalid_transfers_removed,
            route_edges = report.route_edges_updated,
            transfers = report.transfers_updated,
            skipped = report.unresolved_skipped,
            "Repaired graph weights"
        );

        Ok(report)
    }
}

/// Count and mean weight of the graph's edges, by kind.
pub fn edge_statistics(graph: &Graph) -> BTreeMap<EdgeKind, EdgeStats> {
    let mut totals: BTreeMap<EdgeKind, (usize, f64)> = BTreeMap::new();
    for edge in graph.edges() {
        let entry = totals.entry(edge.kind()).or_default();
        entry.0 += 1;
        entry.1 += edge.transit_time();
    }

    totals
        .into_iter()
        .map(|(kind, (count, total))| {
            let stats = EdgeStats {
                count,
                mean_minutes: total / count as f64,
            };
            (kind, stats)
        })
        .collect()
}

fn round_tenth(minutes: f64) -> f64 {
    (minutes * 10.0).round() / 10.0
}
