use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::PredictionModel;

/// Engine-level settings: active model, cache, re-projection cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model used by `current_predictor()`. Default: Kalman filter.
    pub active_model: PredictionModel,
    /// Period of the background re-projection task. Default: 5 s.
    pub reprojection_interval_ms: u64,
    /// Lifetime of a cached prediction/cone pair. Default: 10 s.
    pub cache_ttl_secs: u64,
    /// Maximum cached peers. Default: 10 000.
    pub cache_max_entries: u64,
    /// Degradation events retained in memory. Default: 1000.
    pub degradation_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            active_model: PredictionModel::KalmanFilter,
            reprojection_interval_ms: defaults::DEFAULT_REPROJECTION_INTERVAL_MS,
            cache_ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            cache_max_entries: defaults::DEFAULT_CACHE_MAX_ENTRIES,
            degradation_log_capacity: defaults::DEFAULT_DEGRADATION_LOG_CAPACITY,
        }
    }
}
