//! Confidence cones: a center line from the last known position to the
//! prediction, with left/right boundaries at non-decreasing half-widths.
//!
//! Each model derives the width from its own uncertainty:
//! heading spread for the linear model, propagated position covariance for
//! the Kalman filter, and particle spread for the particle filter.

pub mod geometry;
pub mod kalman;
pub mod linear;
pub mod particle;

use meshtrack_core::config::{ConeConfig, PredictionConfig};
use meshtrack_core::models::{
    ConfidenceCone, LocationPrediction, ModelPayload, PeerLocationHistory, PredictionModel,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConeGenerator {
    config: ConeConfig,
}

impl ConeGenerator {
    pub fn new(config: ConeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConeConfig {
        &self.config
    }

    /// Build the cone for `prediction`.
    ///
    /// The cone starts at the newest sample inside `config`'s age window as
    /// of `prediction.made_at`; with no such sample it starts at the
    /// prediction itself. A zero-confidence prediction yields a single-point
    /// cone. A model prediction without its payload (e.g. after a fallback)
    /// is drawn as a linear cone.
    pub fn generate(
        &self,
        prediction: &LocationPrediction,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
    ) -> ConfidenceCone {
        if !prediction.is_usable() {
            return ConfidenceCone::point(prediction.predicted_location, 0.0);
        }
        let last_known = history
            .window(config.max_history_age(), prediction.made_at)
            .next_back();
        match (prediction.model, &prediction.payload) {
            (PredictionModel::KalmanFilter, Some(ModelPayload::Kalman(track))) => {
                kalman::cone(&self.config, prediction, track)
            }
            (PredictionModel::ParticleFilter, Some(ModelPayload::Particles(cloud))) => {
                let start = last_known.map_or(prediction.made_at, |s| s.timestamp);
                particle::cone(&self.config, prediction, cloud, start)
            }
            _ => linear::cone(&self.config, prediction, last_known),
        }
    }
}
