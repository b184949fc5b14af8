//! Disk persistence for built graphs.
//!
//! A snapshot is a versioned JSON document listing stops and edges. Transfer
//! edges are written with route id -1. Loading goes through
//! [`Graph::from_parts`], so a snapshot that violates a graph invariant is
//! rejected rather than repaired.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Coordinate, Edge, EdgeKind, InvalidRouteId, RouteId, Stop, StopId};
use crate::graph::{Graph, GraphError};

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors from saving or loading a graph snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid snapshot document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible version
    #[error("unsupported snapshot version {found} (expected {})", SNAPSHOT_VERSION)]
    UnsupportedVersion { found: u32 },

    /// An edge carries a route id that is neither a route nor a transfer
    #[error("invalid edge: {0}")]
    RouteId(#[from] InvalidRouteId),

    /// The snapshot describes a graph that breaks an invariant
    #[error("invalid graph: {0}")]
    Invalid(#[from] GraphError),
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    /// Unix timestamp when the snapshot was written.
    saved_at_secs: u64,
    stops: Vec<StopRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StopRecord {
    id: StopId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Coordinate>,
    routes: Vec<RouteId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    from: StopId,
    to: StopId,
    route_id: i64,
    minutes: f64,
}

impl Snapshot {
    fn of(graph: &Graph) -> Self {
        let saved_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let stops = graph
            .stops()
            .iter()
            .map(|s| StopRecord {
                id: s.id(),
                name: s.name().to_string(),
                position: s.position(),
                routes: s.route_ids().iter().copied().collect(),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|e| EdgeRecord {
                from: e.from(),
                to: e.to(),
                route_id: e.kind().as_raw(),
                minutes: e.transit_time(),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            saved_at_secs,
            stops,
            edges,
        }
    }

    fn into_graph(self) -> Result<Graph, StoreError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
            });
        }

        let stops = self.stops.into_iter().map(|record| {
            let mut stop = Stop::new(record.id, record.name);
            if let Some(position) = record.position {
                stop = stop.with_position(position);
            }
            stop.add_routes(record.routes);
            stop
        });

        let edges = self
            .edges
            .into_iter()
            .map(|record| {
                let kind = EdgeKind::from_raw(record.route_id)?;
                Ok(Edge::new(record.from, record.to, kind, record.minutes))
            })
            .collect::<Result<Vec<_>, InvalidRouteId>>()?;

        Ok(Graph::from_parts(stops, edges)?)
    }
}

/// Saves and loads graph snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct GraphStore {
    path: PathBuf,
}

impl GraphStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write a snapshot of `graph`.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, graph: &Graph) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(&Snapshot::of(graph))?;
        std::fs::write(&self.path, json).map_err(|source| self.io_error(source))?;

        info!(
            path = %self.path.display(),
            stops = graph.len(),
            edges = graph.edge_count(),
            "Saved graph snapshot"
        );
        Ok(())
    }

    /// Load and validate a snapshot.
    pub fn load(&self) -> Result<Graph, StoreError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let graph = Self::from_json(&contents)?;

        info!(
            path = %self.path.display(),
            stops = graph.len(),
            edges = graph.edge_count(),
            "Loaded graph snapshot"
        );
        Ok(graph)
    }

    /// Parse a snapshot document.
    pub fn from_json(json: &str) -> Result<Graph, StoreError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.into_graph()
    }

    /// Render a snapshot document.
    pub fn to_json(graph: &Graph) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&Snapshot::of(graph))?)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
