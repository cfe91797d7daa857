use serde::{Deserialize, Serialize};

use super::defaults;

/// Particle filter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Fixed population size. Default: 500.
    pub particle_count: usize,
    /// Resample when the effective sample size drops below this fraction of the population. Default: 0.5.
    pub resample_threshold: f64,
    /// Seeding spread and likelihood std when a sample reports no accuracy. Default: 20 m.
    pub default_accuracy_m: f64,
    /// Weighted positional spread at which confidence reaches zero. Default: 1500 m.
    pub confidence_spread_ceiling_m: f64,
    /// Position jitter applied after resampling. Default: 1 m.
    pub roughening_m: f64,
    /// Optional global seed mixed into every peer's RNG seed.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: defaults::DEFAULT_PARTICLE_COUNT,
            resample_threshold: defaults::DEFAULT_RESAMPLE_THRESHOLD,
            default_accuracy_m: defaults::DEFAULT_ACCURACY_M,
            confidence_spread_ceiling_m: defaults::DEFAULT_CONFIDENCE_SPREAD_CEILING_M,
            roughening_m: defaults::DEFAULT_ROUGHENING_M,
            seed: None,
        }
    }
}
