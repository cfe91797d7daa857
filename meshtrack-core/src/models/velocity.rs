use serde::{Deserialize, Serialize};

use crate::geo::{bearing_of, normalize_bearing};

/// Ground velocity of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityVector {
    pub speed_mps: f64,
    /// Degrees clockwise from true north, [0, 360).
    pub heading_deg: f64,
    pub heading_uncertainty_deg: f64,
}

impl VelocityVector {
    pub fn new(speed_mps: f64, heading_deg: f64, heading_uncertainty_deg: f64) -> Self {
        Self {
            speed_mps: speed_mps.max(0.0),
            heading_deg: normalize_bearing(heading_deg),
            heading_uncertainty_deg: heading_uncertainty_deg.clamp(0.0, 180.0),
        }
    }

    pub fn from_components(east_mps: f64, north_mps: f64, heading_uncertainty_deg: f64) -> Self {
        Self::new(
            east_mps.hypot(north_mps),
            bearing_of(east_mps, north_mps),
            heading_uncertainty_deg,
        )
    }

    pub fn east_mps(&self) -> f64 {
        self.speed_mps * self.heading_deg.to_radians().sin()
    }

    pub fn north_mps(&self) -> f64 {
        self.speed_mps * self.heading_deg.to_radians().cos()
    }
}
