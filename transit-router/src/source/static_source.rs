//! In-memory data source for testing and offline builds.
//!
//! Data is either assembled with [`StaticSourceBuilder`] or loaded from a
//! JSON fixture file, and served as if it came from the live services.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;

use crate::domain::{Coordinate, Direction, RouteId, StopId};

use super::error::SourceError;
use super::{DataSource, DirectionInfo, StopRecord};

type RouteKey = (RouteId, Direction);

/// Data source backed by in-memory tables.
#[derive(Debug, Default)]
pub struct StaticSource {
    stops: HashMap<RouteKey, Vec<StopRecord>>,
    direction_names: HashMap<RouteKey, String>,
    segments: HashMap<(RouteId, Direction, StopId, StopId), f64>,
    coordinates: HashMap<StopId, Coordinate>,
    serving: HashMap<StopId, BTreeSet<RouteId>>,
    lookups: AtomicUsize,
}

impl StaticSource {
    pub fn builder() -> StaticSourceBuilder {
        StaticSourceBuilder::default()
    }

    /// Load a fixture file.
    ///
    /// ```json
    /// {
    ///   "routes": [{ "route": 901, "direction": 0, "name": "Northbound",
    ///                "stops": [{ "id": 1, "name": "Mall of America" }],
    ///                "segments": [{ "from": 1, "to": 2, "minutes": 2.5 }] }],
    ///   "stops": [{ "id": 1, "latitude": 44.85, "longitude": -93.24 }]
    /// }
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SourceError::NotFound(format!("failed to read fixture {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Parse a fixture from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let fixture: Fixture = serde_json::from_str(json).map_err(|e| SourceError::Json {
            message: e.to_string(),
        })?;

        let mut builder = Self::builder();
        for route in fixture.routes {
            let stops: Vec<(u32, String)> =
                route.stops.into_iter().map(|s| (s.id, s.name)).collect();
            builder = builder.route_named(
                RouteId(route.route),
                Direction(route.direction),
                route.name.unwrap_or_default(),
                stops,
            );
            for seg in route.segments {
                builder = builder.segment(
                    RouteId(route.route),
                    Direction(route.direction),
                    StopId(seg.from),
                    StopId(seg.to),
                    seg.minutes,
                );
            }
        }
        for stop in fixture.stops {
            builder = builder.coordinate(StopId(stop.id), stop.latitude, stop.longitude);
            if !stop.routes.is_empty() {
                builder = builder.serving(StopId(stop.id), stop.routes.into_iter().map(RouteId));
            }
        }

        Ok(builder.build())
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn count(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }
}

impl DataSource for StaticSource {
    async fn list_stops(
        &self,
        route: RouteId,
        direction: Direction,
    ) -> Result<Vec<StopRecord>, SourceError> {
        self.count();
        self.stops
            .get(&(route, direction))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("route {route} direction {direction}")))
    }

    async fn segment_time(
        &self,
        route: RouteId,
        direction: Direction,
        from: StopId,
        to: StopId,
    ) -> Result<f64, SourceError> {
        self.count();
        self.segments
            .get(&(route, direction, from, to))
            .copied()
            .ok_or_else(|| SourceError::NotFound(format!("segment {from} -> {to} on {route}")))
    }

    async fn coordinate(&self, stop: StopId) -> Result<Coordinate, SourceError> {
        self.count();
        self.coordinates
            .get(&stop)
            .copied()
            .ok_or_else(|| SourceError::NotFound(format!("stop {stop}")))
    }

    async fn routes_serving(&self, stop: StopId) -> Result<BTreeSet<RouteId>, SourceError> {
        self.count();
        Ok(self.serving.get(&stop).cloned().unwrap_or_default())
    }

    async fn directions(&self, route: RouteId) -> Result<Vec<DirectionInfo>, SourceError> {
        self.count();
        let mut directions: Vec<DirectionInfo> = self
            .stops
            .keys()
            .filter(|(r, _)| *r == route)
            .map(|key| DirectionInfo {
                id: key.1,
                name: self.direction_names.get(key).cloned().unwrap_or_default(),
            })
            .collect();
        directions.sort_by_key(|d| d.id);
        Ok(directions)
    }
}

/// Builder for [`StaticSource`].
#[derive(Debug, Default)]
pub struct StaticSourceBuilder {
    inner: StaticSource,
}

impl StaticSourceBuilder {
    /// Add the ordered stop list for a route and direction.
    pub fn route<S: Into<String>>(
        self,
        route: RouteId,
        direction: Direction,
        stops: impl IntoIterator<Item = (u32, S)>,
    ) -> Self {
        self.route_named(route, direction, String::new(), stops)
    }

    /// Add a route with a direction name.
    pub fn route_named<S: Into<String>>(
        mut self,
        route: RouteId,
        direction: Direction,
        name: impl Into<String>,
        stops: impl IntoIterator<Item = (u32, S)>,
    ) -> Self {
        let records = stops
            .into_iter()
            .map(|(id, name)| StopRecord::new(StopId(id), name))
            .collect();
        self.inner.stops.insert((route, direction), records);
        self.inner
            .direction_names
            .insert((route, direction), name.into());
        self
    }

    /// Add a scheduled segment time.
    pub fn segment(
        mut self,
        route: RouteId,
        direction: Direction,
        from: StopId,
        to: StopId,
        minutes: f64,
    ) -> Self {
        self.inner
            .segments
            .insert((route, direction, from, to), minutes);
        self
    }

    /// Add a stop position.
    pub fn coordinate(mut self, stop: StopId, latitude: f64, longitude: f64) -> Self {
        self.inner
            .coordinates
            .insert(stop, Coordinate::new(latitude, longitude));
        self
    }

    /// Set the routes serving a stop.
    pub fn serving(mut self, stop: StopId, routes: impl IntoIterator<Item = RouteId>) -> Self {
        self.inner
            .serving
            .entry(stop)
            .or_default()
            .extend(routes);
        self
    }

    pub fn build(self) -> StaticSource {
        self.inner
    }
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    routes: Vec<FixtureRoute>,
    #[serde(default)]
    stops: Vec<FixtureStop>,
}

#[derive(Debug, Deserialize)]
struct FixtureRoute {
    route: u32,
    direction: u8,
    #[serde(default)]
    name: Option<String>,
    stops: Vec<FixtureRouteStop>,
    #[serde(default)]
    segments: Vec<FixtureSegment>,
}

#[derive(Debug, Deserialize)]
struct FixtureRouteStop {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FixtureSegment {
    from: u32,
    to: u32,
    minutes: f64,
}

#[derive(Debug, Deserialize)]
struct FixtureStop {
    id: u32,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    routes: Vec<u32>,
}
