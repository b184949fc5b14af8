//! Building single-route graphs from a data source.
//!
//! Construction is two-phase: stops are created inert from the source's stop
//! list, then a resolve step attaches positions (and optionally serving
//! routes) in parallel batches. Only after that are route edges created.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::domain::{Direction, Edge, RouteId, Stop, StopId};
use crate::source::DataSource;

use super::config::BuildConfig;
use super::error::GraphError;
use super::Graph;

/// Builds graphs for routes using a [`DataSource`].
pub struct GraphBuilder<'a, S: DataSource> {
    source: &'a S,
    config: &'a BuildConfig,
}

impl<'a, S: DataSource> GraphBuilder<'a, S> {
    pub fn new(source: &'a S, config: &'a BuildConfig) -> Self {
        Self { source, config }
    }

    /// Build the graph of one route in one direction.
    ///
    /// Creates one edge per consecutive stop pair. Co-located pairs get a
    /// weight of 0.0; every other pair takes its scheduled time from the
    /// source, or 0.0 if the lookup fails.
    pub async fn build_route(
        &self,
        route: RouteId,
        direction: Direction,
    ) -> Result<Graph, GraphError> {
        let records = self
            .source
            .list_stops(route, direction)
            .await
            .map_err(|source| GraphError::StopList {
                route,
                direction,
                source,
            })?;

        // Denylisted stops are removed from the graph entirely, so their
        // neighbours become consecutive.
        let mut sequence: Vec<StopId> = Vec::with_capacity(records.len());
        let mut stops: Vec<Stop> = Vec::with_capacity(records.len());
        let mut seen: HashMap<StopId, usize> = HashMap::new();

        for record in records {
            if self.config.denylist.contains(&record.id) {
                debug!(route = %route, stop = %record.id, "Dropping denylisted stop");
                continue;
            }
            sequence.push(record.id);
            if !seen.contains_key(&record.id) {
                seen.insert(record.id, stops.len());
                stops.push(Stop::new(record.id, record.name).with_route(route));
            }
        }

        if stops.is_empty() {
            return Err(GraphError::NoStops { route, direction });
        }

        self.resolve_stops(&mut stops).await;

        let position = |id: &StopId| seen.get(id).and_then(|&i| stops[i].position());

        // Pairs that need a schedule lookup, and those that don't.
        let mut edges: Vec<Edge> = Vec::with_capacity(sequence.len().saturating_sub(1));
        let mut lookups: Vec<usize> = Vec::new();

        for pair in sequence.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from == to {
                continue;
            }
            let co_located = match (position(&from), position(&to)) {
                (Some(a), Some(b)) => a.is_near(&b, self.config.proximity_threshold),
                _ => false,
            };
            if !co_located {
                lookups.push(edges.len());
            }
            edges.push(Edge::route(from, to, route, 0.0));
        }

        for batch in lookups.chunks(self.config.batch_size.max(1)) {
            let futures: Vec<_> = batch
                .iter()
                .map(|&i| {
                    let (from, to) = (edges[i].from(), edges[i].to());
                    async move {
                        let result = self.source.segment_time(route, direction, from, to).await;
                        (i, result)
                    }
                })
                .collect();

            for (i, result) in join_all(futures).await {
                let edge = &mut edges[i];
                match result {
                    Ok(minutes) if minutes.is_finite() && minutes >= 0.0 => {
                        edge.set_transit_time(minutes);
                    }
                    Ok(minutes) => {
                        warn!(
                            route = %route,
                            from = %edge.from(),
                            to = %edge.to(),
                            minutes,
                            "Ignoring invalid segment time, using 0.0"
                        );
                    }
                    Err(e) => {
                        warn!(
                            route = %route,
                            from = %edge.from(),
                            to = %edge.to(),
                            error = %e,
                            "Failed to fetch segment time, using 0.0"
                        );
                    }
                }
            }
        }

        let mut graph = Graph::new();
        for stop in stops {
            graph.insert_stop(stop)?;
        }
        for edge in edges {
            graph.push_edge(edge);
        }
        graph.validate()?;

        info!(
            route = %route,
            direction = %direction,
            stops = graph.len(),
            edges = graph.edge_count(),
            "Built route graph"
        );

        Ok(graph)
    }

    /// Build every direction of every route and merge them into one graph.
    ///
    /// Routes or directions that fail to build are logged and skipped; the
    /// network build only fails if nothing could be built.
    pub async fn build_network(&self, routes: &[RouteId]) -> Result<Graph, GraphError> {
        let mut graphs = Vec::new();

        for &route in routes {
            let directions = match self.source.directions(route).await {
                Ok(d) if !d.is_empty() => d,
                Ok(_) => {
                    warn!(route = %route, "No directions found, skipping route");
                    continue;
                }
                Err(e) => {
                    warn!(route = %route, error = %e, "Failed to fetch directions, skipping route");
                    continue;
                }
            };

            for direction in directions {
                match self.build_route(route, direction.id).await {
                    Ok(graph) => graphs.push(graph),
                    Err(e) => {
                        warn!(
                            route = %route,
                            direction = %direction.id,
                            name = %direction.name,
                            error = %e,
                            "Failed to build route graph"
                        );
                    }
                }
            }
        }

        if graphs.is_empty() {
            return Err(GraphError::EmptyNetwork);
        }

        Graph::merge(graphs, self.config)
    }

    /// Attach positions (and optionally serving routes) to stops.
    ///
    /// Lookups that fail leave the stop unresolved; nothing here aborts.
    async fn resolve_stops(&self, stops: &mut [Stop]) {
        let batch_size = self.config.batch_size.max(1);

        for batch in stops.chunks_mut(batch_size) {
            let futures: Vec<_> = batch
                .iter()
                .map(|stop| {
                    let id = stop.id();
                    async move {
                        let position = self.source.coordinate(id).await;
                        let routes = if self.config.merge_serving_routes {
                            Some(self.source.routes_serving(id).await)
                        } else {
                            None
                        };
                        (position, routes)
                    }
                })
                .collect();

            let results = join_all(futures).await;

            for (stop, (position, routes)) in batch.iter_mut().zip(results) {
                match position {
                    Ok(p) => stop.resolve(p),
                    Err(e) => {
                        warn!(stop = %stop.id(), error = %e, "Failed to resolve stop position");
                    }
                }
                match routes {
                    Some(Ok(routes)) => stop.add_routes(routes),
                    Some(Err(e)) => {
                        debug!(stop = %stop.id(), error = %e, "Failed to fetch serving routes");
                    }
                    None => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use crate::source::StaticSource;

    const BLUE: RouteId = RouteId(901);
    const NORTH: Direction = Direction(0);

    fn blue_line() -> StaticSource {
        StaticSource::builder()
            .route(
                BLUE,
                NORTH,
                [(1, "Mall of America"), (2, "30th Ave"), (3, "Bloomington Central")],
            )
            .segment(BLUE, NORTH, StopId(1), StopId(2), 2.0)
            .segment(BLUE, NORTH, StopId(2), StopId(3), 3.0)
            .coordinate(StopId(1), 44.854, -93.239)
            .coordinate(StopId(2), 44.858, -93.223)
            .coordinate(StopId(3), 44.856, -93.226)
            .build()
    }

    #[tokio::test]
    async fn builds_consecutive_edges() {
        let source = blue_line();
        let config = BuildConfig::default();
        let graph = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);

        let first = &graph.edges_from(StopId(1))[0];
        assert_eq!(first.to(), StopId(2));
        assert_eq!(first.route_id(), Some(BLUE));
        assert_eq!(first.transit_time(), 2.0);
        assert_eq!(graph.edges_from(StopId(2))[0].transit_time(), 3.0);

        for stop in graph.stops() {
            assert!(stop.is_resolved());
            assert!(stop.serves(BLUE));
        }
    }

    #[tokio::test]
    async fn co_located_pair_gets_zero_weight() {
        let source = StaticSource::builder()
            .route(BLUE, NORTH, [(1, "Platform 1"), (2, "Platform 2")])
            .segment(BLUE, NORTH, StopId(1), StopId(2), 4.0)
            .coordinate(StopId(1), 44.9832, -93.2771)
            .coordinate(StopId(2), 44.9835, -93.2768)
            .build();
        let config = BuildConfig::default();
        let graph = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await
            .unwrap();

        assert_eq!(graph.edges_from(StopId(1))[0].transit_time(), 0.0);
        // Only stop-list and coordinate lookups were issued.
        assert_eq!(source.lookup_count(), 3);
    }

    #[tokio::test]
    async fn failed_lookups_degrade_to_defaults() {
        let source = StaticSource::builder()
            .route(BLUE, NORTH, [(1, "A"), (2, "B")])
            .coordinate(StopId(1), 44.0, -93.0)
            .build();
        let config = BuildConfig::default();
        let graph = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await
            .unwrap();

        assert_eq!(graph.edges_from(StopId(1))[0].transit_time(), 0.0);
        assert!(graph.stop(StopId(1)).unwrap().is_resolved());
        assert!(!graph.stop(StopId(2)).unwrap().is_resolved());
    }

    #[tokio::test]
    async fn denylisted_stop_is_removed_entirely() {
        let source = StaticSource::builder()
            .route(BLUE, NORTH, [(1, "A"), (11838, "Bad"), (3, "C")])
            .segment(BLUE, NORTH, StopId(1), StopId(3), 6.0)
            .coordinate(StopId(1), 44.0, -93.0)
            .coordinate(StopId(3), 44.1, -93.0)
            .build();
        let config = BuildConfig::default();
        let graph = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await
            .unwrap();

        assert!(!graph.contains(StopId(11838)));
        assert_eq!(graph.len(), 2);
        let edge = &graph.edges_from(StopId(1))[0];
        assert_eq!(edge.to(), StopId(3));
        assert_eq!(edge.transit_time(), 6.0);
        assert!(graph.edges().all(|e| e.to() != StopId(11838)));
    }

    #[tokio::test]
    async fn empty_stop_list_is_fatal() {
        let source = StaticSource::builder()
            .route(BLUE, NORTH, Vec::<(u32, &str)>::new())
            .build();
        let config = BuildConfig::default();
        let result = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await;

        assert!(matches!(result, Err(GraphError::NoStops { .. })));
    }

    #[tokio::test]
    async fn unavailable_stop_list_is_fatal() {
        let source = StaticSource::builder().build();
        let config = BuildConfig::default();
        let result = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await;

        assert!(matches!(result, Err(GraphError::StopList { .. })));
    }

    #[tokio::test]
    async fn serving_routes_are_merged_when_enabled() {
        let source = StaticSource::builder()
            .route(BLUE, NORTH, [(1, "A"), (2, "B")])
            .coordinate(StopId(1), 44.0, -93.0)
            .coordinate(StopId(2), 44.1, -93.0)
            .serving(StopId(1), [RouteId(5), RouteId(901)])
            .build();
        let config = BuildConfig::default().with_serving_routes(true);
        let graph = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await
            .unwrap();

        assert!(graph.stop(StopId(1)).unwrap().serves(RouteId(5)));
        assert!(!graph.stop(StopId(2)).unwrap().serves(RouteId(5)));
    }

    #[tokio::test]
    async fn loop_route_keeps_one_stop_per_id() {
        let source = StaticSource::builder()
            .route(BLUE, NORTH, [(1, "A"), (2, "B"), (1, "A")])
            .segment(BLUE, NORTH, StopId(1), StopId(2), 2.0)
            .segment(BLUE, NORTH, StopId(2), StopId(1), 2.5)
            .coordinate(StopId(1), 44.0, -93.0)
            .coordinate(StopId(2), 44.1, -93.0)
            .build();
        let config = BuildConfig::default();
        let graph = GraphBuilder::new(&source, &config)
            .build_route(BLUE, NORTH)
            .await
            .unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_from(StopId(2))[0].transit_time(), 2.5);
    }

    #[tokio::test]
    async fn network_merges_directions_and_routes() {
        let green = RouteId(902);
        let source = StaticSource::builder()
            .route(BLUE, NORTH, [(1, "A"), (2, "B")])
            .route(BLUE, Direction(1), [(2, "B"), (1, "A")])
            .route(green, Direction(0), [(10, "X"), (11, "Y")])
            .segment(BLUE, NORTH, StopId(1), StopId(2), 2.0)
            .segment(BLUE, Direction(1), StopId(2), StopId(1), 2.0)
            .segment(green, Direction(0), StopId(10), StopId(11), 4.0)
            .coordinate(StopId(1), 44.0, -93.0)
            .coordinate(StopId(2), 44.1, -93.0)
            // Y sits on top of B.
            .coordinate(StopId(10), 44.3, -93.0)
            .coordinate(StopId(11), 44.1002, -93.0003)
            .build();
        let config = BuildConfig::default();
        let graph = GraphBuilder::new(&source, &config)
            .build_network(&[BLUE, green, RouteId(999)])
            .await
            .unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.transfer_edges().count(), 2);
        assert_eq!(graph.edge_count(), 3 + 2);
        assert_eq!(
            graph.stop(StopId(11)).unwrap().position(),
            Some(Coordinate::new(44.1002, -93.0003))
        );
    }

    #[tokio::test]
    async fn network_with_nothing_built_fails() {
        let source = StaticSource::builder().build();
        let config = BuildConfig::default();
        let result = GraphBuilder::new(&source, &config)
            .build_network(&[BLUE])
            .await;
        assert!(matches!(result, Err(GraphError::EmptyNetwork)));
    }
}
