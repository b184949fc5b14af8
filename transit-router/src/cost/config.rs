//! Cost model configuration.

use std::collections::HashMap;

use crate::domain::RouteId;
use crate::graph::GraphError;

/// Service class of a route, which determines its average speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    LightRail,
    BusRapidTransit,
    Bus,
}

/// Policy values for estimating edge weights.
#[derive(Debug, Clone)]
pub struct CostConfig {
    /// Explicit route classes. Routes not listed are standard buses.
    pub route_classes: HashMap<RouteId, RouteClass>,

    /// Average light-rail speed (km/h).
    pub light_rail_kmh: f64,

    /// Average bus-rapid-transit speed (km/h).
    pub brt_kmh: f64,

    /// Average standard bus speed (km/h).
    pub bus_kmh: f64,

    /// Dwell time added to every route segment (minutes).
    pub dwell_minutes: f64,

    /// Lower bound on any route segment's estimated time (minutes).
    pub min_segment_minutes: f64,

    /// Fixed time charged for every transfer edge (minutes).
    ///
    /// Must exceed the cost of any single realistic route segment, or the
    /// search will take spurious transfers instead of staying on a route.
    pub transfer_penalty: f64,
}

impl CostConfig {
    /// Classify a route.
    pub fn class_of(&self, route: RouteId) -> RouteClass {
        self.route_classes
            .get(&route)
            .copied()
            .unwrap_or(RouteClass::Bus)
    }

    /// Average speed of a route class (km/h).
    pub fn speed_kmh(&self, class: RouteClass) -> f64 {
        match class {
            RouteClass::LightRail => self.light_rail_kmh,
            RouteClass::BusRapidTransit => self.brt_kmh,
            RouteClass::Bus => self.bus_kmh,
        }
    }

    /// Check that every parameter yields finite, non-negative weights.
    ///
    /// Speeds must be positive; dwell, minimum segment and transfer penalty
    /// must be non-negative.
    pub fn validate(&self) -> Result<(), GraphError> {
        let speeds = [
            ("light_rail_kmh", self.light_rail_kmh),
            ("brt_kmh", self.brt_kmh),
            ("bus_kmh", self.bus_kmh),
        ];
        let minutes = [
            ("dwell_minutes", self.dwell_minutes),
            ("min_segment_minutes", self.min_segment_minutes),
            ("transfer_penalty", self.transfer_penalty),
        ];

        let invalid = speeds
            .into_iter()
            .find(|&(_, v)| !v.is_finite() || v <= 0.0)
            .or_else(|| minutes.into_iter().find(|&(_, v)| !v.is_finite() || v < 0.0));

        match invalid {
            Some((parameter, value)) => Err(GraphError::InvalidCostParameter { parameter, value }),
            None => Ok(()),
        }
    }

    /// Assign a class to a route.
    pub fn with_route_class(mut self, route: RouteId, class: RouteClass) -> Self {
        self.route_classes.insert(route, class);
        self
    }

    /// Set the transfer penalty.
    pub fn with_transfer_penalty(mut self, minutes: f64) -> Self {
        self.transfer_penalty = minutes;
        self
    }

    /// Set the minimum route segment time.
    pub fn with_min_segment(mut self, minutes: f64) -> Self {
        self.min_segment_minutes = minutes;
        self
    }

    /// Set the per-segment dwell time.
    pub fn with_dwell(mut self, minutes: f64) -> Self {
        self.dwell_minutes = minutes;
        self
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        let route_classes = HashMap::from([
            (RouteId(901), RouteClass::LightRail),       // Blue Line
            (RouteId(902), RouteClass::LightRail),       // Green Line
            (RouteId(921), RouteClass::BusRapidTransit), // A Line
        ]);

        Self {
            route_classes,
            light_rail_kmh: 40.0,
            brt_kmh: 24.0,
            bus_kmh: 19.0,
            dwell_minutes: 0.5,
            min_segment_minutes: 1.0,
            transfer_penalty: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CostConfig::default();

        assert_eq!(config.class_of(RouteId(901)), RouteClass::LightRail);
        assert_eq!(config.class_of(RouteId(902)), RouteClass::LightRail);
        assert_eq!(config.class_of(RouteId(921)), RouteClass::BusRapidTransit);
        assert_eq!(config.class_of(RouteId(63)), RouteClass::Bus);
        assert_eq!(config.speed_kmh(RouteClass::LightRail), 40.0);
        assert_eq!(config.speed_kmh(RouteClass::BusRapidTransit), 24.0);
        assert_eq!(config.speed_kmh(RouteClass::Bus), 19.0);
        assert_eq!(config.dwell_minutes, 0.5);
        assert_eq!(config.min_segment_minutes, 1.0);
        assert_eq!(config.transfer_penalty, 10.0);
    }

    #[test]
    fn custom_config() {
        let config = CostConfig::default()
            .with_route_class(RouteId(63), RouteClass::BusRapidTransit)
            .with_transfer_penalty(15.0)
            .with_min_segment(0.5)
            .with_dwell(0.0);

        assert_eq!(config.class_of(RouteId(63)), RouteClass::BusRapidTransit);
        assert_eq!(config.transfer_penalty, 15.0);
        assert_eq!(config.min_segment_minutes, 0.5);
        assert_eq!(config.dwell_minutes, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_parameters() {
        assert!(CostConfig::default().validate().is_ok());

        let err = CostConfig::default()
            .with_transfer_penalty(-1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidCostParameter {
                parameter: "transfer_penalty",
                ..
            }
        ));

        let mut stalled = CostConfig::default();
        stalled.bus_kmh = 0.0;
        assert!(matches!(
            stalled.validate(),
            Err(GraphError::InvalidCostParameter { parameter: "bus_kmh", .. })
        ));

        assert!(CostConfig::default().with_dwell(f64::NAN).validate().is_err());
        assert!(CostConfig::default().with_min_segment(f64::INFINITY).validate().is_err());
    }
}
