//! Geographic coordinates and great-circle distances.

use serde::{Deserialize, Serialize};

use crate::EARTH_RADIUS_KM;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point from degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(self, other: Self) -> f64 {
        haversine_distance_km(self.lat, self.lng, other.lat, other.lng)
    }

    /// Point reached by travelling `distance_m` metres from `self` along
    /// the initial `bearing_deg` (clockwise from north).
    ///
    /// # Examples
    /// ```
    /// use voices::geo::GeoPoint;
    /// let origin = GeoPoint::new(0.0, 0.0);
    /// let there = origin.destination(90.0, 20.0);
    /// assert!((origin.distance_km(there) - 0.020).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn destination(self, bearing_deg: f64, distance_m: f64) -> Self {
        let angular = distance_m / 1000.0 / EARTH_RADIUS_KM;
        let bearing = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();

        let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lng2 = lng1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        Self {
            lat: lat2.to_degrees(),
            lng: lng2.to_degrees(),
        }
    }
}

/// Great-circle distance between two coordinates using the haversine
/// formula and an Earth radius of 6371 km.
///
/// The result is symmetric in its arguments and zero for identical points.
///
/// # Examples
/// ```
/// use voices::haversine_distance_km;
/// assert_eq!(haversine_distance_km(51.5, -0.12, 51.5, -0.12), 0.0);
/// let d = haversine_distance_km(0.0, 0.0, 0.0, 1.0);
/// assert!((d - 111.19).abs() < 0.01);
/// ```
#[must_use]
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
