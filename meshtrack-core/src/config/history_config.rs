use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::defaults;
use super::prediction_config::minutes;

/// Bounds applied to every peer's location history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest samples are evicted once a peer holds more than this. Default: 200.
    pub max_samples_per_peer: usize,
    /// Samples older than this (relative to the newest sample) are evicted,
    /// and peers silent for longer are pruned. Default: 60.
    pub retention_minutes: f64,
}

impl HistoryConfig {
    pub fn retention(&self) -> Duration {
        minutes(self.retention_minutes)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_samples_per_peer: defaults::DEFAULT_MAX_SAMPLES_PER_PEER,
            retention_minutes: defaults::DEFAULT_RETENTION_MINUTES,
        }
    }
}
