//! Shortest-path search over a built graph.
//!
//! Five interchangeable algorithms share one graph, one frontier ordering
//! and one path-reconstruction contract:
//!
//! - [`dijkstra`]: minimum time, single source.
//! - [`astar`]: minimum time, guided by straight-line distance.
//! - [`weighted_astar`]: faster, possibly suboptimal A*.
//! - [`floyd_warshall`]: all-pairs matrices, queried for one pair.
//! - [`bfs`]: fewest edges, ignoring time.
//!
//! Searches only read the graph, so any number may run concurrently against
//! a shared `&Graph`.

mod astar;
mod bfs;
mod compare;
mod config;
mod dijkstra;
mod floyd;
mod frontier;
mod path;
mod search;

pub use astar::{astar, weighted_astar};
pub use bfs::bfs;
pub use compare::{AlgorithmSummary, Comparison, ComparisonRow, Scenario, compare};
pub use config::SearchConfig;
pub use dijkstra::dijkstra;
pub use floyd::{AllPairs, floyd_warshall};
pub use path::{path_minutes, reconstruct_path};
pub use search::{Algorithm, Metrics, Planner, SearchError, SearchOutcome};
