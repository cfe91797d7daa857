use serde::{Deserialize, Serialize};

use super::defaults;

/// Confidence cone geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeConfig {
    /// Number of segments along the center line (points = segments + 1). Default: 12.
    pub segments: usize,
    /// Lower bound on every half-width. Default: 5 m.
    pub min_half_width_m: f64,
    /// Heading uncertainty assumed when the history cannot estimate one. Default: 15°.
    pub default_heading_uncertainty_deg: f64,
    /// Heading uncertainty is clamped to this before taking its tangent. Default: 75°.
    pub max_heading_uncertainty_deg: f64,
    /// Standard deviations covered by the Kalman and particle cones. Default: 2.
    pub sigma_multiplier: f64,
}

impl Default for ConeConfig {
    fn default() -> Self {
        Self {
            segments: defaults::DEFAULT_CONE_SEGMENTS,
            min_half_width_m: defaults::DEFAULT_MIN_HALF_WIDTH_M,
            default_heading_uncertainty_deg: defaults::DEFAULT_HEADING_UNCERTAINTY_DEG,
            max_heading_uncertainty_deg: defaults::DEFAULT_MAX_HEADING_UNCERTAINTY_DEG,
            sigma_multiplier: defaults::DEFAULT_SIGMA_MULTIPLIER,
        }
    }
}
