//! Geodesy helpers: great-circle distance, bearing and destination on a
//! spherical Earth, plus the local east/north tangent-plane frame the
//! Kalman and particle filters do their linear algebra in.

use crate::constants::EARTH_RADIUS_M;
use crate::models::GeoPoint;

/// Great-circle (haversine) distance in meters.
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Initial great-circle bearing from `a` to `b`, degrees in [0, 360).
pub fn initial_bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Point reached travelling `distance_m` along the great circle starting at
/// `origin` with initial bearing `bearing_deg`.
pub fn destination(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    if distance_m == 0.0 {
        return origin;
    }
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

    GeoPoint::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Normalize a bearing to [0, 360).
pub fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Normalize a longitude to [-180, 180).
pub fn normalize_longitude(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Signed smallest difference `b - a` between two bearings, in (-180, 180].
pub fn bearing_difference_deg(a: f64, b: f64) -> f64 {
    let d = (b - a).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Bearing in degrees of an east/north vector (0 = north, 90 = east).
pub fn bearing_of(east: f64, north: f64) -> f64 {
    normalize_bearing(east.atan2(north).to_degrees())
}

/// Local east/north tangent-plane frame anchored at a geodetic origin.
///
/// Uses the equirectangular small-angle approximation, which is accurate to
/// well under a meter within a few kilometers of the origin. Filters that
/// travel further re-anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin: GeoPoint,
    cos_lat: f64,
}

impl LocalFrame {
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            cos_lat: origin.latitude.to_radians().cos().max(1e-6),
        }
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Geodetic point → (east, north) meters relative to the origin.
    pub fn to_local(&self, point: GeoPoint) -> (f64, f64) {
        let dlat = (point.latitude - self.origin.latitude).to_radians();
        let dlon = normalize_longitude(point.longitude - self.origin.longitude).to_radians();
        (
            EARTH_RADIUS_M * dlon * self.cos_lat,
            EARTH_RADIUS_M * dlat,
        )
    }

    /// (east, north) meters relative to the origin → geodetic point.
    pub fn to_geodetic(&self, east: f64, north: f64) -> GeoPoint {
        let lat = self.origin.latitude + (north / EARTH_RADIUS_M).to_degrees();
        let lon = self.origin.longitude + (east / (EARTH_RADIUS_M * self.cos_lat)).to_degrees();
        GeoPoint::new(lat.clamp(-90.0, 90.0), normalize_longitude(lon))
    }
}
