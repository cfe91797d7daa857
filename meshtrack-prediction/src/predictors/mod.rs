//! The three interchangeable predictors and the sum type that dispatches them.
//!
//! Every predictor shares one contract: given a history window and the
//! peer's recursive state, produce a [`LocationPrediction`]. Recursive
//! models (Kalman, particle) replay only the samples newer than their last
//! update, so repeated calls with an unchanged history are idempotent.

pub mod kalman;
pub mod linear;
pub mod particle;

use chrono::{DateTime, Duration, Utc};
use meshtrack_core::config::{PredictionConfig, TrackingConfig};
use meshtrack_core::constants::LINEAR_FLOOR_FACTOR;
use meshtrack_core::errors::PredictionError;
use meshtrack_core::models::{
    ConfidenceCone, LocationPrediction, LocationSample, PeerFilterState, PeerLocationHistory,
    PredictionModel,
};
use meshtrack_core::traits::ILocationPredictor;

use crate::cone::ConeGenerator;

pub use kalman::KalmanPredictor;
pub use linear::LinearPredictor;
pub use particle::ParticlePredictor;

/// Recoverable issues observed while producing one prediction.
///
/// None of these fail the call; the engine turns them into metrics and
/// degradation records.
#[derive(Debug, Default)]
pub struct PredictionDiagnostics {
    pub issues: Vec<PredictionError>,
    /// The recursive model failed and the linear result was returned instead.
    pub fell_back: bool,
    pub resamples: usize,
    pub reanchors: usize,
}

impl PredictionDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && !self.fell_back
    }

    pub(crate) fn push(&mut self, issue: PredictionError) {
        self.issues.push(issue);
    }
}

/// Sum type over the three predictors.
#[derive(Debug, Clone)]
pub enum Predictor {
    Linear(LinearPredictor),
    KalmanFilter(KalmanPredictor),
    ParticleFilter(ParticlePredictor),
}

impl Predictor {
    pub fn from_config(model: PredictionModel, config: &TrackingConfig) -> Self {
        let cone = ConeGenerator::new(config.cone);
        let linear = LinearPredictor::new(config.linear, cone);
        match model {
            PredictionModel::Linear => Predictor::Linear(linear),
            PredictionModel::KalmanFilter => {
                Predictor::KalmanFilter(KalmanPredictor::new(config.kalman, linear))
            }
            PredictionModel::ParticleFilter => {
                Predictor::ParticleFilter(ParticlePredictor::new(config.particle, linear))
            }
        }
    }

    pub fn cone_generator(&self) -> &ConeGenerator {
        match self {
            Predictor::Linear(p) => p.cone_generator(),
            Predictor::KalmanFilter(p) => p.linear().cone_generator(),
            Predictor::ParticleFilter(p) => p.linear().cone_generator(),
        }
    }

    /// Predict and report recoverable issues into `diagnostics`.
    pub fn predict_with_diagnostics(
        &self,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
        state: &mut PeerFilterState,
        now: DateTime<Utc>,
        diagnostics: &mut PredictionDiagnostics,
    ) -> LocationPrediction {
        match self {
            Predictor::Linear(p) => p.predict(history, config, &state.profile, now, diagnostics),
            Predictor::KalmanFilter(p) => p.predict(history, config, state, now, diagnostics),
            Predictor::ParticleFilter(p) => p.predict(history, config, state, now, diagnostics),
        }
    }
}

impl ILocationPredictor for Predictor {
    fn model(&self) -> PredictionModel {
        match self {
            Predictor::Linear(_) => PredictionModel::Linear,
            Predictor::KalmanFilter(_) => PredictionModel::KalmanFilter,
            Predictor::ParticleFilter(_) => PredictionModel::ParticleFilter,
        }
    }

    fn predict(
        &self,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
        state: &mut PeerFilterState,
        now: DateTime<Utc>,
    ) -> LocationPrediction {
        let mut diagnostics = PredictionDiagnostics::default();
        self.predict_with_diagnostics(history, config, state, now, &mut diagnostics)
    }

    fn confidence_cone(
        &self,
        prediction: &LocationPrediction,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
    ) -> ConfidenceCone {
        self.cone_generator().generate(prediction, history, config)
    }
}

/// Instant a prediction targets: horizon past `now`, or past the last
/// sample if it is stamped in the future.
pub(crate) fn target_time(
    last_sample: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &PredictionConfig,
) -> DateTime<Utc> {
    let base = last_sample.map_or(now, |last| last.max(now));
    base.checked_add_signed(config.horizon()).unwrap_or(base)
}

/// Samples inside the age window, or the zero-confidence result when there
/// are too few of them.
pub(crate) fn windowed_samples<'a>(
    history: &'a PeerLocationHistory,
    config: &PredictionConfig,
    model: PredictionModel,
    now: DateTime<Utc>,
    diagnostics: &mut PredictionDiagnostics,
) -> Result<Vec<&'a LocationSample>, LocationPrediction> {
    let window: Vec<&LocationSample> = history.window(config.max_history_age(), now).collect();
    let required = config.min_history_entries.max(1);
    if window.len() >= required {
        return Ok(window);
    }

    diagnostics.push(PredictionError::InsufficientHistory {
        required,
        available: window.len(),
    });
    let last = history.latest();
    Err(LocationPrediction::insufficient(
        history.peer_id(),
        model,
        last.map(LocationSample::point),
        now,
        target_time(last.map(|s| s.timestamp), now, config),
    ))
}

/// A recursive track is stale when its last update fell out of the age
/// window, or when it is ahead of the newest sample (history was replaced).
pub(crate) fn is_stale(
    last_update: DateTime<Utc>,
    newest_sample: DateTime<Utc>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> bool {
    let too_old = now
        .checked_sub_signed(max_age)
        .map_or(false, |cutoff| last_update < cutoff);
    too_old || last_update > newest_sample
}

/// Lower bound for recursive-model confidence, relative to the linear model.
pub(crate) fn confidence_floor(linear_confidence: f64) -> f64 {
    LINEAR_FLOOR_FACTOR * linear_confidence
}

/// Heading uncertainty from a velocity estimate and its 2×2 covariance.
///
/// The cross-track velocity std over the speed, as an angle; 180° when the
/// peer is effectively not moving.
pub(crate) fn heading_uncertainty_deg(
    velocity_east: f64,
    velocity_north: f64,
    covariance: [[f64; 2]; 2],
) -> f64 {
    let speed = velocity_east.hypot(velocity_north);
    if speed < 1e-3 || !speed.is_finite() {
        return 180.0;
    }
    let (ux, uy) = (-velocity_north / speed, velocity_east / speed);
    let cross_var = ux * ux * covariance[0][0]
        + 2.0 * ux * uy * covariance[0][1]
        + uy * uy * covariance[1][1];
    cross_var.max(0.0).sqrt().atan2(speed).to_degrees()
}
