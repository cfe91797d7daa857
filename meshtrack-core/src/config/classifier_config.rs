use serde::{Deserialize, Serialize};

use super::defaults;

/// Decision-table thresholds for the movement classifier.
///
/// These are tunable defaults, not derived constants. Validate against
/// real traces before tightening them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Mean speed below this is STATIONARY. Default: 0.5 m/s.
    pub stationary_max_speed_mps: f64,
    /// Mean speed below this is WALKING_HIKING. Default: 2.5 m/s.
    pub walking_max_speed_mps: f64,
    /// Mean speed at or above this, with a steady heading, is HIGHWAY_DRIVING. Default: 22 m/s.
    pub highway_min_speed_mps: f64,
    /// Maximum heading standard deviation for HIGHWAY_DRIVING. Default: 12°.
    pub highway_max_heading_std_deg: f64,
    /// Upper speed bound for BOATING. Default: 12 m/s.
    pub boating_max_speed_mps: f64,
    /// Maximum speed coefficient of variation for BOATING. Default: 0.2.
    pub boating_max_speed_cv: f64,
    /// Minimum path straightness for BOATING. Default: 0.8.
    pub boating_min_straightness: f64,
    /// Noise scale reported when the history is too short to classify. Default: 2.5.
    pub unknown_noise_scale: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            stationary_max_speed_mps: defaults::DEFAULT_STATIONARY_MAX_SPEED_MPS,
            walking_max_speed_mps: defaults::DEFAULT_WALKING_MAX_SPEED_MPS,
            highway_min_speed_mps: defaults::DEFAULT_HIGHWAY_MIN_SPEED_MPS,
            highway_max_heading_std_deg: defaults::DEFAULT_HIGHWAY_MAX_HEADING_STD_DEG,
            boating_max_speed_mps: defaults::DEFAULT_BOATING_MAX_SPEED_MPS,
            boating_max_speed_cv: defaults::DEFAULT_BOATING_MAX_SPEED_CV,
            boating_min_straightness: defaults::DEFAULT_BOATING_MIN_STRAIGHTNESS,
            unknown_noise_scale: defaults::DEFAULT_UNKNOWN_NOISE_SCALE,
        }
    }
}
