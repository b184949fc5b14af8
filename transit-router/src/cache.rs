//! Caching layer for data source lookups.
//!
//! Building a network asks for the same stop's position and serving routes
//! once per route and direction the stop appears on. Both change rarely, so
//! they are cached per stop. Stop lists, directions and segment times are
//! asked for once per build and pass straight through.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Coordinate, Direction, RouteId, StopId};
use crate::source::{DataSource, DirectionInfo, SourceError, StopRecord};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per lookup kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Data source with cached per-stop lookups.
///
/// Only successful lookups are cached; failures are retried on the next
/// call.
pub struct CachedSource<S> {
    source: S,
    coordinates: MokaCache<StopId, Coordinate>,
    serving: MokaCache<StopId, Arc<BTreeSet<RouteId>>>,
}

impl<S: DataSource> CachedSource<S> {
    /// Create a new cached source.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let coordinates = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let serving = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            source,
            coordinates,
            serving,
        }
    }

    /// Access the underlying source for operations that bypass cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.coordinates.entry_count() + self.serving.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.coordinates.invalidate_all();
        self.serving.invalidate_all();
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    async fn list_stops(
        &self,
        route: RouteId,
        direction: Direction,
    ) -> Result<Vec<StopRecord>, SourceError> {
        self.source.list_stops(route, direction).await
    }

    async fn segment_time(
        &self,
        route: RouteId,
        direction: Direction,
        from: StopId,
        to: StopId,
    ) -> Result<f64, SourceError> {
        self.source.segment_time(route, direction, from, to).await
    }

    async fn coordinate(&self, stop: StopId) -> Result<Coordinate, SourceError> {
        if let Some(cached) = self.coordinates.get(&stop).await {
            trace!(%stop, "Coordinate cache hit");
            return Ok(cached);
        }

        let coordinate = self.source.coordinate(stop).await?;
        self.coordinates.insert(stop, coordinate).await;
        Ok(coordinate)
    }

    async fn routes_serving(&self, stop: StopId) -> Result<BTreeSet<RouteId>, SourceError> {
        if let Some(cached) = self.serving.get(&stop).await {
            trace!(%stop, "Serving routes cache hit");
            return Ok(cached.as_ref().clone());
        }

        let routes = self.source.routes_serving(stop).await?;
        self.serving.insert(stop, Arc::new(routes.clone())).await;
        Ok(routes)
    }

    async fn directions(&self, route: RouteId) -> Result<Vec<DirectionInfo>, SourceError> {
        self.source.directions(route).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    fn source() -> StaticSource {
        StaticSource::builder()
            .route(RouteId(901), Direction(0), [(1, "Target Field"), (2, "Warehouse")])
            .coordinate(StopId(1), 44.983, -93.277)
            .serving(StopId(1), [RouteId(901), RouteId(902)])
            .build()
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[tokio::test]
    async fn coordinate_lookups_are_cached() {
        let cached = CachedSource::new(source(), &CacheConfig::default());

        let first = cached.coordinate(StopId(1)).await.unwrap();
        let second = cached.coordinate(StopId(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.source().lookup_count(), 1);
    }

    #[tokio::test]
    async fn serving_lookups_are_cached() {
        let cached = CachedSource::new(source(), &CacheConfig::default());

        for _ in 0..3 {
            let routes = cached.routes_serving(StopId(1)).await.unwrap();
            assert_eq!(routes.len(), 2);
        }
        assert_eq!(cached.source().lookup_count(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedSource::new(source(), &CacheConfig::default());

        assert!(cached.coordinate(StopId(2)).await.is_err());
        assert!(cached.coordinate(StopId(2)).await.is_err());
        assert_eq!(cached.source().lookup_count(), 2);
    }

    #[tokio::test]
    async fn stop_lists_pass_through() {
        let cached = CachedSource::new(source(), &CacheConfig::default());

        cached.list_stops(RouteId(901), Direction(0)).await.unwrap();
        cached.list_stops(RouteId(901), Direction(0)).await.unwrap();
        assert_eq!(cached.source().lookup_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cached = CachedSource::new(source(), &CacheConfig::default());

        cached.coordinate(StopId(1)).await.unwrap();
        cached.invalidate_cache();
        cached.coordinate(StopId(1)).await.unwrap();
        assert_eq!(cached.source().lookup_count(), 2);
    }
}
