use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// One hypothesis of the particle filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub latitude: f64,
    pub longitude: f64,
    pub velocity_east_mps: f64,
    pub velocity_north_mps: f64,
    /// Normalized linear weight.
    pub weight: f64,
    /// Natural log of `weight`, accumulated before normalization.
    pub log_weight: f64,
}

impl Particle {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.velocity_east_mps.is_finite()
            && self.velocity_north_mps.is_finite()
    }
}

/// A fixed-size particle population for one peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleCloud {
    pub particles: Vec<Particle>,
    /// Time the population was last propagated to.
    pub last_update: DateTime<Utc>,
    /// Seed for the next propagation's RNG.
    pub rng_seed: u64,
}

impl ParticleCloud {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn weight_sum(&self) -> f64 {
        self.particles.iter().map(|p| p.weight).sum()
    }

    /// 1 / Σw². Equals the population size for uniform weights.
    pub fn effective_sample_size(&self) -> f64 {
        let sum_sq: f64 = self.particles.iter().map(|p| p.weight * p.weight).sum();
        if sum_sq > 0.0 {
            1.0 / sum_sq
        } else {
            0.0
        }
    }
}
