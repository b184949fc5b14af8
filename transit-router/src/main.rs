use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use transit_router::cache::{CacheConfig, CachedSource};
use transit_router::cost::{CostConfig, CostModel};
use transit_router::domain::RouteId;
use transit_router::graph::{BuildConfig, Graph, GraphBuilder, GraphError};
use transit_router::planner::SearchConfig;
use transit_router::source::{DataSource, NexTripClient, NexTripConfig, StaticSource};
use transit_router::store::GraphStore;
use transit_router::web::{AppState, create_router};

/// Blue Line, Green Line, A Line and route 63.
const DEFAULT_ROUTES: &str = "901,902,921,63";

const DEFAULT_SNAPSHOT: &str = "data/graph.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let routes = parse_routes(
        &std::env::var("TRANSIT_ROUTES").unwrap_or_else(|_| DEFAULT_ROUTES.to_string()),
    );
    let store = GraphStore::new(
        std::env::var("TRANSIT_GRAPH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT)),
    );

    let mut cost_config = CostConfig::default();
    if let Some(penalty) = std::env::var("TRANSIT_TRANSFER_PENALTY")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
    {
        cost_config = cost_config.with_transfer_penalty(penalty);
    }
    let build_config = BuildConfig::default().with_transfer_weight(cost_config.transfer_penalty);
    // Repaired light-rail segments beat the default heuristic speed.
    let search_config = SearchConfig::admissible_for(&cost_config);

    let graph = if store.exists() {
        store.load().expect("Failed to load graph snapshot")
    } else {
        let mut graph = match std::env::var("TRANSIT_FIXTURE") {
            Ok(path) => {
                info!(%path, "Building from fixture");
                let source = StaticSource::from_json_file(&path).expect("Failed to read fixture");
                build(&source, &build_config, &routes).await
            }
            Err(_) => {
                let mut config = NexTripConfig::new();
                if let Ok(url) = std::env::var("NEXTRIP_BASE_URL") {
                    config = config.with_nextrip_url(url);
                }
                if let Ok(url) = std::env::var("NEXTRIP_SCHEDULE_URL") {
                    config = config.with_schedule_url(url);
                }
                let client = NexTripClient::new(config).expect("Failed to create NexTrip client");
                let source = CachedSource::new(client, &CacheConfig::default());
                build(&source, &build_config, &routes).await
            }
        }
        .expect("Failed to build transit network");

        let report = CostModel::new(cost_config)
            .repair(&mut graph)
            .expect("Repaired graph is invalid");
        if report.unresolved_skipped > 0 {
            warn!(
                skipped = report.unresolved_skipped,
                "Some edges kept their scheduled times"
            );
        }

        if let Err(e) = store.save(&graph) {
            warn!(error = %e, "Failed to save graph snapshot");
        }
        graph
    };

    let state = AppState::new(graph, search_config);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("TRANSIT_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!(%addr, "Transit router listening");
    info!("Endpoints: GET /health, /stops/:id, /search, /compare");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn build<S: DataSource>(
    source: &S,
    config: &BuildConfig,
    routes: &[RouteId],
) -> Result<Graph, GraphError> {
    GraphBuilder::new(source, config).build_network(routes).await
}

fn parse_routes(list: &str) -> Vec<RouteId> {
    list.split(',')
        .filter_map(|s| match s.trim().parse::<u32>() {
            Ok(id) => Some(RouteId(id)),
            Err(_) => {
                warn!(route = s, "Ignoring invalid route id");
                None
            }
        })
        .collect()
}
