//! Transit data sources.
//!
//! The graph builder talks to the outside world only through the
//! [`DataSource`] trait. Two implementations ship with the crate:
//! - [`NexTripClient`] queries the Metro Transit NexTrip and schedule services
//! - [`StaticSource`] serves in-memory or fixture data for tests and offline
//!   builds

mod error;
mod nextrip;
mod static_source;

use std::collections::BTreeSet;

use crate::domain::{Coordinate, Direction, RouteId, StopId};

pub use error::SourceError;
pub use nextrip::{NexTripClient, NexTripConfig};
pub use static_source::{StaticSource, StaticSourceBuilder};

/// A stop as listed by the data source for a route and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRecord {
    pub id: StopId,
    pub name: String,
}

impl StopRecord {
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A direction of travel offered by a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionInfo {
    pub id: Direction,
    pub name: String,
}

/// Provider of raw stop, schedule and location data.
///
/// This abstraction allows graph construction to be tested with static data.
/// Implementations are used in place, never spawned, so the futures carry no
/// `Send` bound.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    /// Ordered stops for a route in one direction.
    async fn list_stops(
        &self,
        route: RouteId,
        direction: Direction,
    ) -> Result<Vec<StopRecord>, SourceError>;

    /// Scheduled travel time in minutes between two stops of a route.
    async fn segment_time(
        &self,
        route: RouteId,
        direction: Direction,
        from: StopId,
        to: StopId,
    ) -> Result<f64, SourceError>;

    /// Position of a stop.
    async fn coordinate(&self, stop: StopId) -> Result<Coordinate, SourceError>;

    /// Routes currently serving a stop.
    async fn routes_serving(&self, stop: StopId) -> Result<BTreeSet<RouteId>, SourceError>;

    /// Directions a route runs in.
    async fn directions(&self, route: RouteId) -> Result<Vec<DirectionInfo>, SourceError>;
}
