//! Graph construction and validation errors.

use crate::domain::{Direction, RouteId, StopId};
use crate::source::SourceError;

/// Errors that prevent a graph from being considered built.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The data source returned an empty stop list
    #[error("no stops returned for route {route}, direction {direction}")]
    NoStops { route: RouteId, direction: Direction },

    /// The stop list could not be fetched at all
    #[error("failed to list stops for route {route}, direction {direction}: {source}")]
    StopList {
        route: RouteId,
        direction: Direction,
        source: SourceError,
    },

    /// Two stops share an id
    #[error("duplicate stop id {0}")]
    DuplicateStop(StopId),

    /// An edge points at a stop that is not in the graph
    #[error("edge {from} -> {to} references a missing stop")]
    MissingEndpoint { from: StopId, to: StopId },

    /// A transfer edge joins stops on a common route
    #[error("transfer edge {from} -> {to} connects stops that share a route")]
    SameRouteTransfer { from: StopId, to: StopId },

    /// An edge weight is negative, NaN or infinite
    #[error("edge {from} -> {to} has invalid weight {weight}")]
    InvalidWeight { from: StopId, to: StopId, weight: f64 },

    /// A cost model parameter would produce invalid weights
    #[error("invalid cost parameter {parameter}: {value}")]
    InvalidCostParameter { parameter: &'static str, value: f64 },

    /// Network build produced no route graphs
    #[error("no route graphs could be built")]
    EmptyNetwork,
}
