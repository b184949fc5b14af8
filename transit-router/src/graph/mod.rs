//! The transit graph.
//!
//! A [`Graph`] owns its stops (in insertion order) and an adjacency map from
//! stop id to outgoing edges. The adjacency map is the only place edges live;
//! a stop's outgoing edges are read through [`Graph::edges_from`].
//!
//! Graphs are built once (see [`GraphBuilder`] and [`Graph::merge`]),
//! optionally repaired by the cost model, and then shared read-only between
//! searches.

mod build;
mod config;
mod error;
mod merge;

use std::collections::HashMap;

use crate::domain::{Edge, Stop, StopId};

pub use build::GraphBuilder;
pub use config::BuildConfig;
pub use error::GraphError;

/// Stops plus directed, weighted edges between them.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    stops: Vec<Stop>,
    index: HashMap<StopId, usize>,
    adjacency: HashMap<StopId, Vec<Edge>>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph from stops and edges, checking every invariant.
    ///
    /// This is how previously built graphs (e.g. loaded from disk) are
    /// accepted without being re-derived.
    pub fn from_parts(
        stops: impl IntoIterator<Item = Stop>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for stop in stops {
            graph.insert_stop(stop)?;
        }
        for edge in edges {
            graph.push_edge(edge);
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Look up a stop by id.
    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.index.get(&id).map(|&i| &self.stops[i])
    }

    pub(crate) fn stop_mut(&mut self, id: StopId) -> Option<&mut Stop> {
        self.index.get(&id).map(|&i| &mut self.stops[i])
    }

    pub fn contains(&self, id: StopId) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of a stop in insertion order.
    pub fn index_of(&self, id: StopId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// All stops in insertion order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Outgoing edges of a stop (empty for unknown stops).
    pub fn edges_from(&self, id: StopId) -> &[Edge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every edge, grouped by source stop in stop insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.stops.iter().flat_map(|s| self.edges_from(s.id()))
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Every transfer edge.
    pub fn transfer_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges().filter(|e| e.is_transfer())
    }

    /// True if both stops exist and are served by exactly the same routes.
    pub fn is_same_route(&self, a: StopId, b: StopId) -> bool {
        match (self.stop(a), self.stop(b)) {
            (Some(a), Some(b)) => a.route_ids() == b.route_ids(),
            _ => false,
        }
    }

    /// Add a stop. Fails if a stop with the same id already exists.
    pub(crate) fn insert_stop(&mut self, stop: Stop) -> Result<(), GraphError> {
        let id = stop.id();
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateStop(id));
        }
        self.index.insert(id, self.stops.len());
        self.stops.push(stop);
        Ok(())
    }

    /// Append an edge to its source stop's adjacency list.
    ///
    /// Unchecked; callers validate before handing the graph out.
    pub(crate) fn push_edge(&mut self, edge: Edge) {
        self.adjacency.entry(edge.from()).or_default().push(edge);
    }

    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> + '_ {
        self.adjacency.values_mut().flatten()
    }

    /// Keep only edges matching `keep`. Returns how many were removed.
    pub(crate) fn retain_edges(&mut self, mut keep: impl FnMut(&Graph, &Edge) -> bool) -> usize {
        let mut adjacency = std::mem::take(&mut self.adjacency);
        let mut removed = 0;
        for edges in adjacency.values_mut() {
            let before = edges.len();
            edges.retain(|e| keep(self, e));
            removed += before - edges.len();
        }
        self.adjacency = adjacency;
        removed
    }

    /// Check every structural invariant.
    ///
    /// - every edge endpoint is a stop of this graph
    /// - every weight is finite and non-negative
    /// - no transfer edge joins stops sharing a route
    pub fn validate(&self) -> Result<(), GraphError> {
        for (from_id, edges) in &self.adjacency {
            for edge in edges {
                let (Some(from), Some(to)) = (self.stop(edge.from()), self.stop(edge.to())) else {
                    return Err(GraphError::MissingEndpoint {
                        from: edge.from(),
                        to: edge.to(),
                    });
                };
                debug_assert_eq!(*from_id, edge.from());

                if !edge.has_valid_weight() {
                    return Err(GraphError::InvalidWeight {
                        from: edge.from(),
                        to: edge.to(),
                        weight: edge.transit_time(),
                    });
                }

                if edge.is_transfer() && from.shares_route_with(to) {
                    return Err(GraphError::SameRouteTransfer {
                        from: edge.from(),
                        to: edge.to(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, RouteId};

    fn stop(id: u32, route: u32) -> Stop {
        Stop::new(StopId(id), format!("Stop {id}"))
            .with_route(RouteId(route))
            .with_position(Coordinate::new(44.9, -93.2))
    }

    #[test]
    fn from_parts_builds_adjacency() {
        let graph = Graph::from_parts(
            [stop(1, 901), stop(2, 901), stop(3, 901)],
            [
                Edge::route(StopId(1), StopId(2), RouteId(901), 2.0),
                Edge::route(StopId(2), StopId(3), RouteId(901), 3.0),
            ],
        )
        .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_from(StopId(1)).len(), 1);
        assert!(graph.edges_from(StopId(3)).is_empty());
        assert!(graph.edges_from(StopId(99)).is_empty());
        assert_eq!(graph.index_of(StopId(3)), Some(2));
        assert_eq!(graph.stop(StopId(2)).unwrap().name(), "Stop 2");
        assert!(graph.stop(StopId(4)).is_none());
    }

    #[test]
    fn edges_iterate_in_stop_order() {
        let graph = Graph::from_parts(
            [stop(3, 1), stop(1, 1), stop(2, 1)],
            [
                Edge::route(StopId(2), StopId(3), RouteId(1), 1.0),
                Edge::route(StopId(3), StopId(1), RouteId(1), 1.0),
                Edge::route(StopId(1), StopId(2), RouteId(1), 1.0),
            ],
        )
        .unwrap();

        let from: Vec<StopId> = graph.edges().map(|e| e.from()).collect();
        assert_eq!(from, vec![StopId(3), StopId(1), StopId(2)]);
    }

    #[test]
    fn rejects_duplicate_stop() {
        let result = Graph::from_parts([stop(1, 901), stop(1, 902)], []);
        assert!(matches!(result, Err(GraphError::DuplicateStop(StopId(1)))));
    }

    #[test]
    fn rejects_missing_endpoint() {
        let result = Graph::from_parts(
            [stop(1, 901)],
            [Edge::route(StopId(1), StopId(2), RouteId(901), 1.0)],
        );
        assert!(matches!(result, Err(GraphError::MissingEndpoint { .. })));
    }

    #[test]
    fn rejects_negative_weight() {
        let result = Graph::from_parts(
            [stop(1, 901), stop(2, 901)],
            [Edge::route(StopId(1), StopId(2), RouteId(901), -1.0)],
        );
        assert!(matches!(result, Err(GraphError::InvalidWeight { .. })));
    }

    #[test]
    fn rejects_same_route_transfer() {
        let result = Graph::from_parts(
            [stop(1, 901), stop(2, 901)],
            [Edge::transfer(StopId(1), StopId(2), 0.0)],
        );
        assert!(matches!(result, Err(GraphError::SameRouteTransfer { .. })));
    }

    #[test]
    fn accepts_cross_route_transfer() {
        let graph = Graph::from_parts(
            [stop(1, 901), stop(2, 902)],
            [
                Edge::transfer(StopId(1), StopId(2), 0.0),
                Edge::transfer(StopId(2), StopId(1), 0.0),
            ],
        )
        .unwrap();
        assert_eq!(graph.transfer_edges().count(), 2);
    }

    #[test]
    fn same_route_compares_route_sets() {
        let graph = Graph::from_parts([stop(1, 901), stop(2, 901), stop(3, 902)], []).unwrap();
        assert!(graph.is_same_route(StopId(1), StopId(2)));
        assert!(!graph.is_same_route(StopId(1), StopId(3)));
        assert!(!graph.is_same_route(StopId(1), StopId(42)));
    }

    #[test]
    fn retain_edges_counts_removed() {
        let mut graph = Graph::from_parts(
            [stop(1, 901), stop(2, 902)],
            [
                Edge::transfer(StopId(1), StopId(2), 0.0),
                Edge::transfer(StopId(2), StopId(1), 0.0),
            ],
        )
        .unwrap();

        let removed = graph.retain_edges(|_, e| e.from() != StopId(1));
        assert_eq!(removed, 1);
        assert_eq!(graph.edge_count(), 1);
    }
}
