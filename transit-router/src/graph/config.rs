//! Graph construction configuration.

use std::collections::BTreeSet;

use crate::domain::StopId;

/// Stop known to return bad data from the live service.
const DEFAULT_DENYLIST: [u32; 1] = [11838];

/// Configuration parameters for building and merging graphs.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Two stops are co-located when both their latitude and longitude
    /// deltas are below this many degrees.
    pub proximity_threshold: f64,

    /// Stop ids removed from every stop list before edges are created.
    pub denylist: BTreeSet<StopId>,

    /// Weight given to newly synthesized transfer edges (minutes).
    /// The repair pass replaces it with the transfer penalty.
    pub transfer_weight: f64,

    /// Number of concurrent lookups issued while resolving stops.
    pub batch_size: usize,

    /// Also ask the source which routes serve each stop, and add them to
    /// the stop's route set.
    pub merge_serving_routes: bool,
}

impl BuildConfig {
    /// Set the proximity threshold in degrees.
    pub fn with_proximity_threshold(mut self, degrees: f64) -> Self {
        self.proximity_threshold = degrees;
        self
    }

    /// Replace the denylist.
    pub fn with_denylist(mut self, stops: impl IntoIterator<Item = StopId>) -> Self {
        self.denylist = stops.into_iter().collect();
        self
    }

    /// Set the initial transfer weight.
    pub fn with_transfer_weight(mut self, minutes: f64) -> Self {
        self.transfer_weight = minutes;
        self
    }

    /// Set the lookup batch size.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Enable or disable merging serving routes from the source.
    pub fn with_serving_routes(mut self, enabled: bool) -> Self {
        self.merge_serving_routes = enabled;
        self
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 0.001,
            denylist: DEFAULT_DENYLIST.into_iter().map(StopId).collect(),
            transfer_weight: 0.0,
            batch_size: 8,
            merge_serving_routes: false,
        }
    }
}
