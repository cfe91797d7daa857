use serde::{Deserialize, Serialize};

use super::defaults;

/// Linear dead-reckoning confidence decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// e-folding time of the confidence decay at noise scale 1. Default: 900 s.
    pub confidence_tau_secs: f64,
    /// Confidence of a zero-elapsed projection. Default: 0.9.
    pub max_confidence: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            confidence_tau_secs: defaults::DEFAULT_LINEAR_CONFIDENCE_TAU_SECS,
            max_confidence: defaults::DEFAULT_LINEAR_MAX_CONFIDENCE,
        }
    }
}
