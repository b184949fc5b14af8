//! Stops: the vertices of the transit graph.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;
use super::route::RouteId;

/// Stable identifier of a physical stop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u32);

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical transit stop.
///
/// A stop is created inert: its position stays unresolved until the graph
/// builder attaches one. Nothing on `Stop` performs lookups.
///
/// `Stop` deliberately has no `PartialEq`/`Ord`. Identity is the id alone;
/// compare stops with [`Stop::same_stop`] and [`Stop::cmp_by_id`].
#[derive(Debug, Clone)]
pub struct Stop {
    id: StopId,
    name: String,
    position: Option<Coordinate>,
    route_ids: BTreeSet<RouteId>,
}

impl Stop {
    /// Create an unresolved stop served by no routes.
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: None,
            route_ids: BTreeSet::new(),
        }
    }

    /// Add a serving route (builder style).
    pub fn with_route(mut self, route: RouteId) -> Self {
        self.route_ids.insert(route);
        self
    }

    /// Attach a position (builder style).
    pub fn with_position(mut self, position: Coordinate) -> Self {
        self.position = Some(position);
        self
    }

    pub fn id(&self) -> StopId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved position, or `None` if resolution never succeeded.
    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    pub fn is_resolved(&self) -> bool {
        self.position.is_some()
    }

    pub fn route_ids(&self) -> &BTreeSet<RouteId> {
        &self.route_ids
    }

    pub fn serves(&self, route: RouteId) -> bool {
        self.route_ids.contains(&route)
    }

    /// True if at least one route serves both stops.
    pub fn shares_route_with(&self, other: &Stop) -> bool {
        !self.route_ids.is_disjoint(&other.route_ids)
    }

    pub fn add_route(&mut self, route: RouteId) {
        self.route_ids.insert(route);
    }

    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = RouteId>) {
        self.route_ids.extend(routes);
    }

    /// Attach a resolved position. Only the builder calls this.
    pub(crate) fn resolve(&mut self, position: Coordinate) {
        self.position = Some(position);
    }

    /// Identity comparison: two stops are the same iff their ids match.
    pub fn same_stop(a: &Stop, b: &Stop) -> bool {
        a.id == b.id
    }

    /// Total order by id, used wherever stops need a deterministic order.
    pub fn cmp_by_id(a: &Stop, b: &Stop) -> Ordering {
        a.id.cmp(&b.id)
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}
