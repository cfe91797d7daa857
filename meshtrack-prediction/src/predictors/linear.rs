//! Constant-velocity straight-line extrapolation.
//!
//! Average velocity is the great-circle displacement across the window over
//! its time span; the prediction continues along the same great circle.
//! Also the fallback for the recursive models.

use chrono::{DateTime, Utc};
use meshtrack_core::config::{LinearConfig, PredictionConfig};
use meshtrack_core::geo::{destination, haversine_distance_m, initial_bearing_deg, normalize_bearing};
use meshtrack_core::models::{
    LocationPrediction, LocationSample, MovementProfile, PeerLocationHistory, PredictionModel,
    VelocityVector,
};

use super::{target_time, windowed_samples, PredictionDiagnostics};
use crate::cone::ConeGenerator;
use crate::motion::{seconds_between, MotionStatistics};

#[derive(Debug, Clone, Copy)]
pub struct LinearPredictor {
    config: LinearConfig,
    cone: ConeGenerator,
}

impl LinearPredictor {
    pub fn new(config: LinearConfig, cone: ConeGenerator) -> Self {
        Self { config, cone }
    }

    pub fn config(&self) -> &LinearConfig {
        &self.config
    }

    pub fn cone_generator(&self) -> &ConeGenerator {
        &self.cone
    }

    /// `max_confidence × exp(-elapsed / (tau / noise_scale))`.
    ///
    /// More erratic movement shortens the decay constant.
    pub fn confidence(&self, elapsed_secs: f64, noise_scale: f64) -> f64 {
        let tau = self.config.confidence_tau_secs / noise_scale.max(0.1);
        let decay = (-elapsed_secs.max(0.0) / tau).exp();
        (self.config.max_confidence * decay).clamp(0.0, 1.0)
    }

    pub fn predict(
        &self,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
        profile: &MovementProfile,
        now: DateTime<Utc>,
        diagnostics: &mut PredictionDiagnostics,
    ) -> LocationPrediction {
        match windowed_samples(history, config, PredictionModel::Linear, now, diagnostics) {
            Ok(window) => self.extrapolate(history.peer_id(), &window, config, profile, now),
            Err(insufficient) => insufficient,
        }
    }

    /// Extrapolate from a non-empty window.
    pub(crate) fn extrapolate(
        &self,
        peer_id: &str,
        window: &[&LocationSample],
        config: &PredictionConfig,
        profile: &MovementProfile,
        now: DateTime<Utc>,
    ) -> LocationPrediction {
        let (Some(&first), Some(&last)) = (window.first(), window.last()) else {
            return LocationPrediction::insufficient(
                peer_id,
                PredictionModel::Linear,
                None,
                now,
                target_time(None, now, config),
            );
        };

        let target = target_time(Some(last.timestamp), now, config);
        let span = seconds_between(first.timestamp, last.timestamp);
        let displacement = haversine_distance_m(first.point(), last.point());

        let velocity = if span > 0.0 && displacement > 0.0 {
            // Final bearing of first → last, so the path keeps its great circle.
            let heading = normalize_bearing(initial_bearing_deg(last.point(), first.point()) + 180.0);
            VelocityVector::new(displacement / span, heading, self.heading_uncertainty(window))
        } else {
            VelocityVector::new(0.0, 0.0, 180.0)
        };

        let elapsed = seconds_between(last.timestamp, target).max(0.0);
        let predicted_location = if velocity.speed_mps > 0.0 {
            destination(last.point(), velocity.heading_deg, velocity.speed_mps * elapsed)
        } else {
            last.point()
        };

        LocationPrediction {
            peer_id: peer_id.to_string(),
            predicted_location,
            made_at: now,
            target_timestamp: target,
            confidence: self.confidence(elapsed, profile.noise_scale),
            velocity: Some(velocity),
            model: PredictionModel::Linear,
            payload: None,
        }
    }

    fn heading_uncertainty(&self, window: &[&LocationSample]) -> f64 {
        let cone = self.cone.config();
        match MotionStatistics::from_samples(window) {
            Some(stats) if stats.heading_steps >= 2 => {
                stats.heading_std_deg.min(cone.max_heading_uncertainty_deg)
            }
            _ => cone.default_heading_uncertainty_deg,
        }
    }
}
