//! Application state for the web layer.

use std::sync::Arc;

use crate::graph::Graph;
use crate::planner::SearchConfig;

/// Shared application state.
///
/// The graph is read-only once the server starts, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// The built, validated transit graph
    pub graph: Arc<Graph>,

    /// Path search configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(graph: Graph, config: SearchConfig) -> Self {
        Self {
            graph: Arc::new(graph),
            config: Arc::new(config),
        }
    }
}
