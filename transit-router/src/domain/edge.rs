//! Directed, weighted segments between stops.

use std::fmt;

use super::route::{EdgeKind, RouteId};
use super::stop::StopId;

/// A directed connection from one stop to another.
///
/// Endpoints and kind are fixed at construction. The weight (minutes) can
/// only be changed by crate-internal maintenance passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    from: StopId,
    to: StopId,
    kind: EdgeKind,
    transit_time: f64,
}

impl Edge {
    pub fn new(from: StopId, to: StopId, kind: EdgeKind, transit_time: f64) -> Self {
        Self {
            from,
            to,
            kind,
            transit_time,
        }
    }

    /// An edge riding `route` from `from` to `to`.
    pub fn route(from: StopId, to: StopId, route: RouteId, transit_time: f64) -> Self {
        Self::new(from, to, EdgeKind::Route(route), transit_time)
    }

    /// A transfer edge between co-located stops on different routes.
    pub fn transfer(from: StopId, to: StopId, transit_time: f64) -> Self {
        Self::new(from, to, EdgeKind::Transfer, transit_time)
    }

    pub fn from(&self) -> StopId {
        self.from
    }

    pub fn to(&self) -> StopId {
        self.to
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// The route ridden, or `None` for a transfer.
    pub fn route_id(&self) -> Option<RouteId> {
        match self.kind {
            EdgeKind::Route(route) => Some(route),
            EdgeKind::Transfer => None,
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == EdgeKind::Transfer
    }

    /// Weight in minutes.
    pub fn transit_time(&self) -> f64 {
        self.transit_time
    }

    pub(crate) fn set_transit_time(&mut self, minutes: f64) {
        self.transit_time = minutes;
    }

    /// True when the weight is usable by the search algorithms.
    pub fn has_valid_weight(&self) -> bool {
        self.transit_time.is_finite() && self.transit_time >= 0.0
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge(Stop {} -> Stop {}, {}, {} min)",
            self.from, self.to, self.kind, self.transit_time
        )
    }
}
