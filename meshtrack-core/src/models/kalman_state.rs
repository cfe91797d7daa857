use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{KALMAN_COVARIANCE_LEN, KALMAN_STATE_DIM};
use crate::geo::LocalFrame;

use super::GeoPoint;

/// Constant-velocity Kalman track for one peer, in a local east/north frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KalmanState {
    /// Geodetic anchor of the local tangent plane.
    pub origin: GeoPoint,
    pub east_m: f64,
    pub north_m: f64,
    pub velocity_east_mps: f64,
    pub velocity_north_mps: f64,
    /// 4×4 covariance over [east, north, v_east, v_north], row-major.
    pub covariance: [f64; KALMAN_COVARIANCE_LEN],
    /// Effective acceleration noise std (base × noise scale) used for process noise.
    pub accel_std_mps2: f64,
    pub last_update: DateTime<Utc>,
}

impl KalmanState {
    pub fn covariance_at(&self, row: usize, col: usize) -> f64 {
        self.covariance[row * KALMAN_STATE_DIM + col]
    }

    /// Sum of the east and north position variances, m².
    pub fn position_variance_trace(&self) -> f64 {
        self.covariance_at(0, 0) + self.covariance_at(1, 1)
    }

    pub fn frame(&self) -> LocalFrame {
        LocalFrame::new(self.origin)
    }

    /// Filtered position as a geodetic point.
    pub fn position(&self) -> GeoPoint {
        self.frame().to_geodetic(self.east_m, self.north_m)
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..KALMAN_STATE_DIM).all(|r| {
            (0..r).all(|c| (self.covariance_at(r, c) - self.covariance_at(c, r)).abs() <= tolerance)
        })
    }

    pub fn is_finite(&self) -> bool {
        self.accel_std_mps2.is_finite()
            && self.east_m.is_finite()
            && self.north_m.is_finite()
            && self.velocity_east_mps.is_finite()
            && self.velocity_north_mps.is_finite()
            && self.covariance.iter().all(|v| v.is_finite())
    }
}
