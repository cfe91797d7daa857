use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{defaults, ensure_non_negative, ensure_positive, invalid};
use crate::errors::ConfigError;

/// Per-call prediction parameters supplied by the settings collaborator.
///
/// Immutable for the duration of one prediction; a changed config takes
/// effect on the next prediction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// How far ahead to project, in minutes.
    pub horizon_minutes: f64,
    /// Fewer samples than this inside the age window yields a zero-confidence prediction.
    pub min_history_entries: usize,
    /// Samples older than this (relative to "now") are ignored.
    pub max_history_age_minutes: f64,
}

impl PredictionConfig {
    pub fn horizon(&self) -> Duration {
        minutes(self.horizon_minutes)
    }

    pub fn max_history_age(&self) -> Duration {
        minutes(self.max_history_age_minutes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("prediction.horizon_minutes", self.horizon_minutes)?;
        ensure_positive("prediction.max_history_age_minutes", self.max_history_age_minutes)?;
        if self.min_history_entries == 0 {
            return Err(invalid("prediction.min_history_entries", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: defaults::DEFAULT_HORIZON_MINUTES,
            min_history_entries: defaults::DEFAULT_MIN_HISTORY_ENTRIES,
            max_history_age_minutes: defaults::DEFAULT_MAX_HISTORY_AGE_MINUTES,
        }
    }
}

/// Upper bound on any configured duration (about a century), which keeps
/// timestamp arithmetic far from chrono's range limits.
const MAX_MINUTES: f64 = 52_560_000.0;

pub(crate) fn minutes(value: f64) -> Duration {
    let clamped = if value.is_finite() {
        value.clamp(0.0, MAX_MINUTES)
    } else {
        MAX_MINUTES
    };
    Duration::milliseconds((clamped * 60_000.0).round() as i64)
}
