use serde::{Deserialize, Serialize};

use super::defaults;

/// Constant-velocity Kalman filter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Re-anchor the tangent-plane origin once a sample lands farther than this. Default: 5 km.
    pub reanchor_distance_m: f64,
    /// Measurement noise std when a sample reports no accuracy. Default: 15 m.
    pub measurement_noise_m: f64,
    /// White-noise acceleration std before noise scaling. Default: 0.1 m/s².
    pub base_accel_std_mps2: f64,
    /// Initial velocity std for a freshly seeded track. Default: 15 m/s.
    pub initial_velocity_std_mps: f64,
    /// Position covariance trace at which confidence reaches zero. Default: 2e6 m².
    pub confidence_trace_ceiling_m2: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            reanchor_distance_m: defaults::DEFAULT_REANCHOR_DISTANCE_M,
            measurement_noise_m: defaults::DEFAULT_MEASUREMENT_NOISE_M,
            base_accel_std_mps2: defaults::DEFAULT_BASE_ACCEL_STD_MPS2,
            initial_velocity_std_mps: defaults::DEFAULT_INITIAL_VELOCITY_STD_MPS,
            confidence_trace_ceiling_m2: defaults::DEFAULT_CONFIDENCE_TRACE_CEILING_M2,
        }
    }
}
