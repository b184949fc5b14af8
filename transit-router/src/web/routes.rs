//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::warn;

use crate::domain::StopId;
use crate::planner::{Algorithm, Planner, Scenario, SearchError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops/:id", get(get_stop))
        .route("/search", get(search))
        .route("/compare", get(compare))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Look up a stop and its outgoing connections.
async fn get_stop(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<StopResponse>, AppError> {
    let stop = state.graph.stop(StopId(id)).ok_or_else(|| AppError::NotFound {
        message: format!("Stop {id} not found"),
    })?;

    Ok(Json(StopResponse::new(stop, state.graph.edges_from(stop.id()))))
}

/// Run one search.
///
/// Unknown stop ids are not an error: the response has an empty path and
/// null metrics.
async fn search(
    State(state): State<AppState>,
    Query(req): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let algorithm: Algorithm = req.algorithm.parse()?;

    // Floyd-Warshall is cubic in the stop count; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || {
        let planner = Planner::new(&state.graph, &state.config);
        planner
            .run(algorithm, StopId(req.from), StopId(req.to), req.weight)
            .map(|outcome| SearchResponse::from_outcome(req.from, req.to, &outcome))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Search task failed: {e}"),
    })??;

    Ok(Json(response))
}

/// Run every algorithm on one trip.
async fn compare(
    State(state): State<AppState>,
    Query(req): Query<CompareQuery>,
) -> Result<Json<CompareResponse>, AppError> {
    let (from, to) = (StopId(req.from), StopId(req.to));
    if !state.graph.contains(from) || !state.graph.contains(to) {
        return Err(AppError::NotFound {
            message: format!("Unknown stop in {from} -> {to}"),
        });
    }

    let repeats = req.repeats.unwrap_or(1).clamp(1, 20);
    let response = tokio::task::spawn_blocking(move || {
        let planner = Planner::new(&state.graph, &state.config);
        let scenario = Scenario::new(format!("{from} -> {to}"), "Ad hoc", from, to);
        let comparison = crate::planner::compare(&planner, &[scenario], repeats);

        CompareResponse {
            from: req.from,
            to: req.to,
            rows: comparison
                .rows
                .iter()
                .map(ComparisonRowResult::from_row)
                .collect(),
            summaries: comparison
                .summaries
                .iter()
                .map(SummaryResult::from_summary)
                .collect(),
        }
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Comparison task failed: {e}"),
    })?;

    Ok(Json(response))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(status = %status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, Edge, RouteId, Stop};
    use crate::graph::{BuildConfig, Graph};
    use crate::planner::SearchConfig;

    fn state() -> AppState {
        let blue = Graph::from_parts(
            [
                Stop::new(StopId(1), "Mall of America")
                    .with_route(RouteId(901))
                    .with_position(Coordinate::new(44.854, -93.239)),
                Stop::new(StopId(2), "Terminal 1")
                    .with_route(RouteId(901))
                    .with_position(Coordinate::new(44.881, -93.205)),
            ],
            [Edge::route(StopId(1), StopId(2), RouteId(901), 6.0)],
        )
        .unwrap();
        let bus = Graph::from_parts(
            [
                Stop::new(StopId(3), "Terminal 1 bus bay")
                    .with_route(RouteId(54))
                    .with_position(Coordinate::new(44.8812, -93.2053)),
                Stop::new(StopId(4), "Downtown St Paul")
                    .with_route(RouteId(54))
                    .with_position(Coordinate::new(44.946, -93.093)),
            ],
            [Edge::route(StopId(3), StopId(4), RouteId(54), 20.0)],
        )
        .unwrap();

        let config = BuildConfig::default().with_transfer_weight(10.0);
        let graph = Graph::merge([blue, bus], &config).unwrap();
        AppState::new(graph, SearchConfig::default())
    }

    fn query(algorithm: &str, from: u32, to: u32, weight: Option<f64>) -> Query<SearchQuery> {
        Query(SearchQuery {
            algorithm: algorithm.to_string(),
            from,
            to,
            weight,
        })
    }

    #[tokio::test]
    async fn health_check() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn stop_lookup() {
        let Json(stop) = get_stop(State(state()), Path(2)).await.unwrap();

        assert_eq!(stop.name, "Terminal 1");
        assert_eq!(stop.routes, vec![901]);
        assert_eq!(stop.latitude, Some(44.881));
        assert_eq!(stop.connections.len(), 1);
        assert_eq!(stop.connections[0].to, 3);
        assert_eq!(stop.connections[0].route_id, -1);
    }

    #[tokio::test]
    async fn unknown_stop_is_404() {
        let err = get_stop(State(state()), Path(99)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_across_transfer() {
        let Json(response) = search(State(state()), query("dijkstra", 1, 4, None))
            .await
            .unwrap();

        let ids: Vec<u32> = response.path.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(response.cost, Some(36.0));
        let metrics = response.metrics.unwrap();
        assert_eq!(metrics.algorithm, "Dijkstra");
        assert_eq!(metrics.path_length, 4);
    }

    #[tokio::test]
    async fn search_unknown_stop_has_null_metrics() {
        let Json(response) = search(State(state()), query("bfs", 1, 77, None))
            .await
            .unwrap();

        assert!(response.path.is_empty());
        assert_eq!(response.cost, None);
        assert!(response.metrics.is_none());
    }

    #[tokio::test]
    async fn search_unreachable_keeps_metrics() {
        let Json(response) = search(State(state()), query("astar", 4, 1, None))
            .await
            .unwrap();

        assert!(response.path.is_empty());
        assert!(response.metrics.is_some());
    }

    #[tokio::test]
    async fn bad_algorithm_is_400() {
        let err = search(State(state()), query("teleport", 1, 4, None))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_weight_is_400() {
        let err = search(State(state()), query("weighted-astar", 1, 4, Some(0.2)))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn weighted_search_reports_weight() {
        let Json(response) = search(State(state()), query("weighted-astar", 1, 4, Some(2.0)))
            .await
            .unwrap();
        assert_eq!(response.metrics.unwrap().weight, Some(2.0));
    }

    #[tokio::test]
    async fn compare_all_algorithms() {
        let req = Query(CompareQuery {
            from: 1,
            to: 4,
            repeats: Some(2),
        });
        let Json(response) = compare(State(state()), req).await.unwrap();

        assert_eq!(response.rows.len(), 5);
        assert_eq!(response.summaries.len(), 5);
        assert!(response.rows.iter().all(|r| r.found));
        assert!(
            response
                .rows
                .iter()
                .filter(|r| r.algorithm != "BFS")
                .all(|r| r.optimal == Some(true))
        );
    }

    #[tokio::test]
    async fn compare_unknown_stop_is_404() {
        let req = Query(CompareQuery {
            from: 1,
            to: 40,
            repeats: None,
        });
        let err = compare(State(state()), req).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn router_builds() {
        let _router = create_router(state());
    }
}
