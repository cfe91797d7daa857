//! Configuration for every meshtrack subsystem.
//!
//! # Examples
//!
//! ```
//! use meshtrack_core::config::TrackingConfig;
//!
//! let config = TrackingConfig::from_toml("[prediction]\nhorizon_minutes = 2.0\n").unwrap();
//! assert!((config.prediction.horizon_minutes - 2.0).abs() < f64::EPSILON);
//! assert_eq!(config.particle.particle_count, 500);
//! ```

pub mod classifier_config;
pub mod cone_config;
pub mod defaults;
pub mod engine_config;
pub mod history_config;
pub mod kalman_config;
pub mod linear_config;
pub mod observability_config;
pub mod particle_config;
pub mod prediction_config;

pub use classifier_config::ClassifierConfig;
pub use cone_config::ConeConfig;
pub use engine_config::EngineConfig;
pub use history_config::HistoryConfig;
pub use kalman_config::KalmanConfig;
pub use linear_config::LinearConfig;
pub use observability_config::ObservabilityConfig;
pub use particle_config::ParticleConfig;
pub use prediction_config::PredictionConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, TrackingResult};

/// Top-level configuration. Every section falls back to its defaults, so an
/// empty TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub prediction: PredictionConfig,
    pub history: HistoryConfig,
    pub classifier: ClassifierConfig,
    pub linear: LinearConfig,
    pub kalman: KalmanConfig,
    pub particle: ParticleConfig,
    pub cone: ConeConfig,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl TrackingConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(input: &str) -> TrackingResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> TrackingResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::ParseFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prediction.validate()?;

        if self.history.max_samples_per_peer < 2 {
            return Err(invalid("history.max_samples_per_peer", "must be at least 2"));
        }
        ensure_positive("history.retention_minutes", self.history.retention_minutes)?;

        ensure_positive("linear.confidence_tau_secs", self.linear.confidence_tau_secs)?;
        if !(0.0..=1.0).contains(&self.linear.max_confidence) {
            return Err(invalid("linear.max_confidence", "must be within [0, 1]"));
        }

        let k = &self.kalman;
        ensure_positive("kalman.reanchor_distance_m", k.reanchor_distance_m)?;
        ensure_positive("kalman.measurement_noise_m", k.measurement_noise_m)?;
        ensure_positive("kalman.base_accel_std_mps2", k.base_accel_std_mps2)?;
        ensure_positive("kalman.initial_velocity_std_mps", k.initial_velocity_std_mps)?;
        ensure_positive("kalman.confidence_trace_ceiling_m2", k.confidence_trace_ceiling_m2)?;

        let pf = &self.particle;
        if pf.particle_count == 0 {
            return Err(invalid("particle.particle_count", "must be at least 1"));
        }
        if !(pf.resample_threshold > 0.0 && pf.resample_threshold <= 1.0) {
            return Err(invalid("particle.resample_threshold", "must be within (0, 1]"));
        }
        ensure_positive("particle.default_accuracy_m", pf.default_accuracy_m)?;
        ensure_positive("particle.confidence_spread_ceiling_m", pf.confidence_spread_ceiling_m)?;
        ensure_non_negative("particle.roughening_m", pf.roughening_m)?;

        let c = &self.cone;
        if c.segments == 0 {
            return Err(invalid("cone.segments", "must be at least 1"));
        }
        ensure_non_negative("cone.min_half_width_m", c.min_half_width_m)?;
        ensure_positive("cone.sigma_multiplier", c.sigma_multiplier)?;
        if !(c.max_heading_uncertainty_deg > 0.0 && c.max_heading_uncertainty_deg < 90.0) {
            return Err(invalid("cone.max_heading_uncertainty_deg", "must be within (0, 90)"));
        }

        if self.engine.cache_max_entries == 0 {
            return Err(invalid("engine.cache_max_entries", "must be at least 1"));
        }
        if self.engine.reprojection_interval_ms == 0 {
            return Err(invalid("engine.reprojection_interval_ms", "must be at least 1"));
        }
        Ok(())
    }
}

pub(crate) fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn ensure_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive finite number"))
    }
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a non-negative finite number"))
    }
}
