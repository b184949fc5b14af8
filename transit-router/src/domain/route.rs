//! Route identifiers and edge kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw route id used for transfer edges in persisted and external data.
pub const TRANSFER_SENTINEL: i64 = -1;

/// Error returned when a raw route id is neither a positive route nor the
/// transfer sentinel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route id: {0}")]
pub struct InvalidRouteId(pub i64);

/// A transit route (line), e.g. 901 for the Blue Line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u32);

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of travel on a route as numbered by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(pub u8);

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an edge represents: riding a route, or changing between routes.
///
/// Ordered routes-first (by id), transfers last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Route(RouteId),
    Transfer,
}

impl EdgeKind {
    /// Decode a raw route id where [`TRANSFER_SENTINEL`] means transfer.
    ///
    /// ```
    /// use transit_router::domain::{EdgeKind, RouteId};
    ///
    /// assert_eq!(EdgeKind::from_raw(-1).unwrap(), EdgeKind::Transfer);
    /// assert_eq!(EdgeKind::from_raw(901).unwrap(), EdgeKind::Route(RouteId(901)));
    /// assert!(EdgeKind::from_raw(0).is_err());
    /// ```
    pub fn from_raw(raw: i64) -> Result<Self, InvalidRouteId> {
        if raw == TRANSFER_SENTINEL {
            return Ok(EdgeKind::Transfer);
        }
        match u32::try_from(raw) {
            Ok(id) if id > 0 => Ok(EdgeKind::Route(RouteId(id))),
            _ => Err(InvalidRouteId(raw)),
        }
    }

    /// Encode as a raw route id, using [`TRANSFER_SENTINEL`] for transfers.
    pub fn as_raw(&self) -> i64 {
        match self {
            EdgeKind::Route(route) => i64::from(route.0),
            EdgeKind::Transfer => TRANSFER_SENTINEL,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Route(route) => write!(f, "route {route}"),
            EdgeKind::Transfer => f.write_str("transfer"),
        }
    }
}
