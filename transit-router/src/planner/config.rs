//! Search configuration for the path planner.

use crate::cost::{CostConfig, RouteClass};

/// Configuration parameters for path search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Speed assumed by the A* heuristic when converting straight-line
    /// distance to minutes (km/h).
    ///
    /// The heuristic stays admissible as long as no real segment is faster
    /// than this.
    pub heuristic_speed_kmh: f64,

    /// Heuristic weight used by weighted A* when a query gives none.
    pub default_weight: f64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(heuristic_speed_kmh: f64, default_weight: f64) -> Self {
        Self {
            heuristic_speed_kmh,
            default_weight,
        }
    }

    /// Configuration whose A* heuristic is admissible on graphs repaired
    /// with `cost`.
    ///
    /// The heuristic speed is raised to the fastest route class. Repaired
    /// segments round to a tenth of a minute, so this holds while the dwell
    /// time is at least 0.05 minutes.
    pub fn admissible_for(cost: &CostConfig) -> Self {
        let fastest = [
            RouteClass::LightRail,
            RouteClass::BusRapidTransit,
            RouteClass::Bus,
        ]
        .into_iter()
        .map(|class| cost.speed_kmh(class))
        .fold(Self::default().heuristic_speed_kmh, f64::max);

        Self {
            heuristic_speed_kmh: fastest,
            ..Self::default()
        }
    }

    /// Whether the heuristic speed can be used to scale distances.
    pub fn has_valid_speed(&self) -> bool {
        self.heuristic_speed_kmh.is_finite() && self.heuristic_speed_kmh > 0.0
    }

    /// Heuristic estimate in minutes for a straight-line distance.
    pub fn heuristic_minutes(&self, km: f64) -> f64 {
        km / self.heuristic_speed_kmh * 60.0
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic_speed_kmh: 30.0,
            default_weight: 1.5,
        }
    }
}
