//! Constant-velocity Kalman filter in a local east/north tangent plane.
//!
//! The track stores its own geodetic origin and re-anchors once a sample
//! lands farther than the configured distance, preserving the filtered
//! geodetic position. Process noise scales with the peer's movement noise
//! scale. After every step the covariance is symmetrized and any negative
//! eigenvalues are clamped; a non-finite state drops the track and returns
//! the linear projection instead.

pub mod math;

use chrono::{DateTime, Utc};
use meshtrack_core::config::{KalmanConfig, PredictionConfig};
use meshtrack_core::errors::PredictionError;
use meshtrack_core::geo::{haversine_distance_m, LocalFrame};
use meshtrack_core::models::{
    KalmanState, LocationPrediction, LocationSample, ModelPayload, PeerFilterState,
    PeerLocationHistory, PredictionModel, VelocityVector,
};
use meshtrack_observability::events;
use nalgebra::{Matrix4, Vector2, Vector4};

use super::{
    confidence_floor, heading_uncertainty_deg, is_stale, target_time, windowed_samples,
    LinearPredictor, PredictionDiagnostics,
};
use crate::motion::seconds_between;

const MODEL_NAME: &str = "KALMAN_FILTER";

#[derive(Debug, Clone, Copy)]
pub struct KalmanPredictor {
    config: KalmanConfig,
    linear: LinearPredictor,
}

impl KalmanPredictor {
    pub fn new(config: KalmanConfig, linear: LinearPredictor) -> Self {
        Self { config, linear }
    }

    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }

    pub fn linear(&self) -> &LinearPredictor {
        &self.linear
    }

    pub fn predict(
        &self,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
        state: &mut PeerFilterState,
        now: DateTime<Utc>,
        diagnostics: &mut PredictionDiagnostics,
    ) -> LocationPrediction {
        let window =
            match windowed_samples(history, config, PredictionModel::KalmanFilter, now, diagnostics) {
                Ok(window) => window,
                Err(insufficient) => return insufficient,
            };
        let peer_id = history.peer_id();
        let Some(&newest) = window.last() else {
            return self.linear.predict(history, config, &state.profile, now, diagnostics);
        };

        if state.kalman.as_ref().is_some_and(|track| {
            is_stale(track.last_update, newest.timestamp, now, config.max_history_age())
        }) {
            state.kalman = None;
        }

        let accel_std = self.config.base_accel_std_mps2 * state.profile.noise_scale;
        let noise_scale = state.profile.noise_scale;
        let result = self
            .filter(peer_id, &window, state.kalman.take(), accel_std, diagnostics)
            .and_then(|track| {
                let prediction =
                    self.project(&track, newest, config, noise_scale, now, diagnostics)?;
                Ok((track, prediction))
            });

        match result {
            Ok((track, prediction)) => {
                state.kalman = Some(track);
                prediction
            }
            Err(err) => {
                events::fallback_to_linear(peer_id, MODEL_NAME, &err.to_string());
                diagnostics.push(err);
                diagnostics.fell_back = true;
                self.linear.extrapolate(peer_id, &window, config, &state.profile, now)
            }
        }
    }

    /// Run every sample newer than the track through predict/update.
    pub fn filter(
        &self,
        peer_id: &str,
        window: &[&LocationSample],
        track: Option<KalmanState>,
        accel_std: f64,
        diagnostics: &mut PredictionDiagnostics,
    ) -> Result<KalmanState, PredictionError> {
        let mut track = track;
        for &sample in window {
            track = Some(match track {
                Some(current) if sample.timestamp <= current.last_update => current,
                Some(current) => self.incorporate(peer_id, current, sample, accel_std, diagnostics)?,
                None => self.initialize(sample, accel_std),
            });
        }
        track.ok_or_else(|| numerical_failure("no samples to filter"))
    }

    fn initialize(&self, sample: &LocationSample, accel_std: f64) -> KalmanState {
        let position_var = self.measurement_variance(sample);
        let velocity_var = self.config.initial_velocity_std_mps.powi(2);
        let covariance = Matrix4::from_diagonal(&Vector4::new(
            position_var,
            position_var,
            velocity_var,
            velocity_var,
        ));
        math::pack(
            sample.point(),
            &Vector4::zeros(),
            &covariance,
            accel_std,
            sample.timestamp,
        )
    }

    fn incorporate(
        &self,
        peer_id: &str,
        track: KalmanState,
        sample: &LocationSample,
        accel_std: f64,
        diagnostics: &mut PredictionDiagnostics,
    ) -> Result<KalmanState, PredictionError> {
        let track = self.reanchor_if_needed(peer_id, track, sample, diagnostics);
        let (x, p) = math::unpack(&track);

        let dt = seconds_between(track.last_update, sample.timestamp);
        let (x, p) = if dt > 0.0 {
            math::predict(&x, &p, dt, accel_std)
        } else {
            (x, p)
        };

        let (east, north) = track.frame().to_local(sample.point());
        let measurement = Vector2::new(east, north);
        let (x, p) = math::update(&x, &p, measurement, self.measurement_variance(sample))
            .ok_or_else(|| numerical_failure("innovation covariance is singular"))?;
        let p = self.repaired(peer_id, &p, diagnostics)?;

        let updated = math::pack(track.origin, &x, &p, accel_std, sample.timestamp);
        if !updated.is_finite() {
            return Err(numerical_failure("non-finite state after update"));
        }
        Ok(updated)
    }

    /// Move the tangent-plane origin to `sample` once it drifted too far.
    fn reanchor_if_needed(
        &self,
        peer_id: &str,
        track: KalmanState,
        sample: &LocationSample,
        diagnostics: &mut PredictionDiagnostics,
    ) -> KalmanState {
        let drift = haversine_distance_m(track.origin, sample.point());
        if drift <= self.config.reanchor_distance_m {
            return track;
        }
        let (east_m, north_m) = LocalFrame::new(sample.point()).to_local(track.position());
        events::origin_reanchored(peer_id, drift);
        diagnostics.reanchors += 1;
        KalmanState {
            origin: sample.point(),
            east_m,
            north_m,
            ..track
        }
    }

    fn project(
        &self,
        track: &KalmanState,
        newest: &LocationSample,
        config: &PredictionConfig,
        noise_scale: f64,
        now: DateTime<Utc>,
        diagnostics: &mut PredictionDiagnostics,
    ) -> Result<LocationPrediction, PredictionError> {
        let peer_id = newest.peer_id.as_str();
        let target = target_time(Some(newest.timestamp), now, config);
        let (x, p) = math::unpack(track);
        let dt = seconds_between(track.last_update, target).max(0.0);
        let (x, p) = math::predict(&x, &p, dt, track.accel_std_mps2);
        let p = self.repaired(peer_id, &p, diagnostics)?;
        if !x.iter().all(|v| v.is_finite()) {
            return Err(numerical_failure("non-finite projected state"));
        }

        let trace = p[(0, 0)] + p[(1, 1)];
        let own = 1.0 - (trace / self.config.confidence_trace_ceiling_m2).sqrt();
        let elapsed = seconds_between(newest.timestamp, target).max(0.0);
        let floor = confidence_floor(self.linear.confidence(elapsed, noise_scale));
        let confidence = own.clamp(0.0, 1.0).max(floor).clamp(0.0, 1.0);

        let velocity_cov = math::velocity_covariance(&p);
        let heading_uncertainty = heading_uncertainty_deg(
            x[2],
            x[3],
            [
                [velocity_cov[(0, 0)], velocity_cov[(0, 1)]],
                [velocity_cov[(1, 0)], velocity_cov[(1, 1)]],
            ],
        );

        Ok(LocationPrediction {
            peer_id: peer_id.to_string(),
            predicted_location: track.frame().to_geodetic(x[0], x[1]),
            made_at: now,
            target_timestamp: target,
            confidence,
            velocity: Some(VelocityVector::from_components(x[2], x[3], heading_uncertainty)),
            model: PredictionModel::KalmanFilter,
            payload: Some(ModelPayload::Kalman(track.clone())),
        })
    }

    fn repaired(
        &self,
        peer_id: &str,
        p: &math::Covariance,
        diagnostics: &mut PredictionDiagnostics,
    ) -> Result<math::Covariance, PredictionError> {
        let repair =
            math::repair_covariance(p).ok_or_else(|| numerical_failure("non-finite covariance"))?;
        if repair.corrected {
            events::covariance_corrected(peer_id, repair.min_eigenvalue);
            diagnostics.push(PredictionError::DegenerateCovariance {
                detail: format!("min eigenvalue {:.3e} clamped to zero", repair.min_eigenvalue),
            });
        }
        Ok(repair.covariance)
    }

    /// Measurement variance, m²: reported accuracy or the configured default.
    fn measurement_variance(&self, sample: &LocationSample) -> f64 {
        let std = sample
            .accuracy_m
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(self.config.measurement_noise_m);
        std.max(1.0).powi(2)
    }
}

fn numerical_failure(detail: &str) -> PredictionError {
    PredictionError::NumericalFailure {
        model: MODEL_NAME.to_string(),
        detail: detail.to_string(),
    }
}
