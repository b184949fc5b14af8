//! Merging single-route graphs and synthesizing transfers.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::domain::{Edge, StopId};

use super::config::BuildConfig;
use super::error::GraphError;
use super::Graph;

impl Graph {
    /// Combine several graphs into one multi-route graph.
    ///
    /// Stops are deduplicated by id; a stop appearing in several graphs ends
    /// up served by the union of their routes and keeps the first position
    /// any of them resolved. Adjacency lists are concatenated, then transfer
    /// edges are synthesized over the combined stop set.
    pub fn merge(
        graphs: impl IntoIterator<Item = Graph>,
        config: &BuildConfig,
    ) -> Result<Graph, GraphError> {
        let mut merged = Graph::new();
        let mut sources = 0;

        for graph in graphs {
            sources += 1;
            let Graph {
                stops, adjacency, ..
            } = graph;

            for stop in stops {
                match merged.stop_mut(stop.id()) {
                    Some(existing) => {
                        existing.add_routes(stop.route_ids().iter().copied());
                        if let Some(position) = stop.position()
                            && !existing.is_resolved()
                        {
                            existing.resolve(position);
                        }
                    }
                    None => merged.insert_stop(stop)?,
                }
            }

            for (id, edges) in adjacency {
                merged.adjacency.entry(id).or_default().extend(edges);
            }
        }

        let transfers =
            merged.synthesize_transfers(config.proximity_threshold, config.transfer_weight);
        merged.validate()?;

        info!(
            graphs = sources,
            stops = merged.len(),
            edges = merged.edge_count(),
            transfers,
            "Merged route graphs"
        );

        Ok(merged)
    }

    /// Add transfer edges between co-located stops on different routes.
    ///
    /// Every unordered pair of resolved stops is examined. A pair gets two
    /// directed transfer edges when both coordinate deltas are below
    /// `threshold` and the stops share no route. Pairs that already have a
    /// transfer edge are left alone. Returns the number of edges added.
    pub fn synthesize_transfers(&mut self, threshold: f64, weight: f64) -> usize {
        let existing: HashSet<(StopId, StopId)> = self
            .transfer_edges()
            .map(|e| (e.from(), e.to()))
            .collect();

        let mut added = Vec::new();

        for (i, a) in self.stops.iter().enumerate() {
            let Some(pa) = a.position() else { continue };
            for b in &self.stops[i + 1..] {
                let Some(pb) = b.position() else { continue };
                if !pa.is_near(&pb, threshold) || a.shares_route_with(b) {
                    continue;
                }

                debug!(from = %a.id(), to = %b.id(), "Synthesizing transfer");
                if !existing.contains(&(a.id(), b.id())) {
                    added.push(Edge::transfer(a.id(), b.id(), weight));
                }
                if !existing.contains(&(b.id(), a.id())) {
                    added.push(Edge::transfer(b.id(), a.id(), weight));
                }
            }
        }

        let count = added.len();
        for edge in added {
            self.push_edge(edge);
        }
        count
    }
}
