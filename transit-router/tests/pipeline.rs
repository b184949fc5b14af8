//! End-to-end tests: fixture source, build, repair, persist, search.

use std::path::PathBuf;

use transit_router::cost::{CostConfig, CostModel};
use transit_router::domain::{RouteId, StopId};
use transit_router::graph::{BuildConfig, Graph, GraphBuilder};
use transit_router::planner::{Algorithm, Planner, Scenario, SearchConfig, compare};
use transit_router::source::StaticSource;
use transit_router::store::GraphStore;

const BLUE: RouteId = RouteId(901);
const GREEN: RouteId = RouteId(902);

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/downtown.json")
}

async fn build_downtown() -> Graph {
    let source = StaticSource::from_json_file(fixture_path()).unwrap();
    let config = BuildConfig::default();
    let mut graph = GraphBuilder::new(&source, &config)
        .build_network(&[BLUE, GREEN])
        .await
        .unwrap();

    CostModel::new(CostConfig::default())
        .repair(&mut graph)
        .unwrap();
    graph
}

#[tokio::test]
async fn fixture_builds_connected_network() {
    let graph = build_downtown().await;

    assert_eq!(graph.len(), 9);
    // Both directions of both lines, plus one transfer each way at Target Field.
    assert_eq!(graph.edge_count(), 4 * 2 + 3 * 2 + 2);

    let transfers: Vec<(StopId, StopId)> = graph
        .transfer_edges()
        .map(|e| (e.from(), e.to()))
        .collect();
    assert!(transfers.contains(&(StopId(51405), StopId(56334))));
    assert!(transfers.contains(&(StopId(56334), StopId(51405))));
    assert!(graph.transfer_edges().all(|e| e.transit_time() == 10.0));
}

#[tokio::test]
async fn repaired_route_edges_respect_minimum() {
    let graph = build_downtown().await;

    assert!(
        graph
            .edges()
            .filter(|e| !e.is_transfer())
            .all(|e| e.transit_time() >= 1.0)
    );
}

#[tokio::test]
async fn cross_line_trip_uses_one_transfer() {
    let graph = build_downtown().await;
    let config = SearchConfig::admissible_for(&CostConfig::default());
    let planner = Planner::new(&graph, &config);

    let outcome = planner
        .run(Algorithm::Dijkstra, StopId(51414), StopId(56338), None)
        .unwrap();

    assert_eq!(
        outcome.stop_ids(),
        vec![
            StopId(51414),
            StopId(51411),
            StopId(51408),
            StopId(51405),
            StopId(56334),
            StopId(56336),
            StopId(56337),
            StopId(56338),
        ]
    );

    let optimum = outcome.cost.unwrap();
    for algorithm in [Algorithm::FloydWarshall, Algorithm::AStar] {
        let other = planner
            .run(algorithm, StopId(51414), StopId(56338), None)
            .unwrap();
        assert!((other.cost.unwrap() - optimum).abs() < 1e-9, "{algorithm}");
    }
}

#[tokio::test]
async fn comparison_over_fixture() {
    let graph = build_downtown().await;
    let config = SearchConfig::admissible_for(&CostConfig::default());
    let planner = Planner::new(&graph, &config);

    let scenarios = [
        Scenario::new("Same line", "Blue", StopId(51415), StopId(51405)),
        Scenario::new("Across downtown", "Transfer", StopId(51415), StopId(56338)),
    ];
    let comparison = compare(&planner, &scenarios, 2);

    assert_eq!(comparison.rows.len(), scenarios.len() * Algorithm::ALL.len());
    assert!(comparison.rows.iter().all(|r| r.found));
    let dijkstra = comparison
        .summaries
        .iter()
        .find(|s| s.algorithm == Algorithm::Dijkstra)
        .unwrap();
    assert_eq!(dijkstra.optimal, 2);
}

#[tokio::test]
async fn snapshot_round_trip_preserves_costs() {
    let graph = build_downtown().await;
    let dir = tempfile::tempdir().unwrap();
    let store = GraphStore::new(dir.path().join("graph.json"));

    store.save(&graph).unwrap();
    let loaded = store.load().unwrap();

    let config = SearchConfig::admissible_for(&CostConfig::default());
    let before = Planner::new(&graph, &config)
        .run(Algorithm::Dijkstra, StopId(56338), StopId(51415), None)
        .unwrap();
    let after = Planner::new(&loaded, &config)
        .run(Algorithm::Dijkstra, StopId(56338), StopId(51415), None)
        .unwrap();

    assert_eq!(before.stop_ids(), after.stop_ids());
    assert_eq!(before.cost, after.cost);
}
