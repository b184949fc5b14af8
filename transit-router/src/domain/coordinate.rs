//! Geographic positions and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres (haversine formula).
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_router::domain::Coordinate;
    ///
    /// let a = Coordinate::new(44.9778, -93.2650);
    /// assert_eq!(a.haversine_km(&a), 0.0);
    /// ```
    pub fn haversine_km(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // Rounding can push `a` fractionally above 1 for antipodal points.
        let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// True when both the latitude and longitude deltas are strictly below
    /// `threshold` degrees.
    pub fn is_near(&self, other: &Coordinate, threshold: f64) -> bool {
        (self.latitude - other.latitude).abs() < threshold
            && (self.longitude - other.longitude).abs() < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        let c = Coordinate::new(44.8548, -93.2422);
        assert_eq!(c.haversine_km(&c), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!((a.haversine_km(&b) - expected).abs() < 1e-9);
    }

    #[test]
    fn downtown_minneapolis_to_mall_of_america() {
        // Target Field to Mall of America is roughly 14.5 km as the crow flies.
        let target_field = Coordinate::new(44.9832, -93.2771);
        let moa = Coordinate::new(44.8548, -93.2422);
        let km = target_field.haversine_km(&moa);
        assert!(km > 14.0 && km < 16.0, "got {km}");
    }

    #[test]
    fn near_uses_strict_threshold_on_both_axes() {
        let a = Coordinate::new(44.0, -93.0);
        assert!(a.is_near(&Coordinate::new(44.0005, -93.0005), 0.001));
        assert!(!a.is_near(&Coordinate::new(44.002, -93.0), 0.001));
        assert!(!a.is_near(&Coordinate::new(44.0, -93.002), 0.001));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-89.0f64..89.0, -179.0f64..179.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        /// Distance is symmetric
        #[test]
        fn symmetric(a in coordinate(), b in coordinate()) {
            prop_assert!((a.haversine_km(&b) - b.haversine_km(&a)).abs() < 1e-6);
        }

        /// Distance never exceeds half the circumference
        #[test]
        fn bounded(a in coordinate(), b in coordinate()) {
            let d = a.haversine_km(&b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
        }

        /// Triangle inequality holds, which keeps the A* heuristic consistent
        #[test]
        fn triangle(a in coordinate(), b in coordinate(), c in coordinate()) {
            prop_assert!(a.haversine_km(&c) <= a.haversine_km(&b) + b.haversine_km(&c) + 1e-6);
        }
    }
}
