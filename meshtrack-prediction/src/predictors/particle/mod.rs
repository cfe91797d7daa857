//! Sequential importance resampling over position and velocity hypotheses.
//!
//! Weights live in log space and are normalized by subtracting the maximum
//! before exponentiating. The population is resampled systematically once
//! the effective sample size drops below the configured fraction. Every
//! random draw comes from a seeded [`StdRng`]: the population seed derives
//! from the peer id, so the same history yields the same prediction.

pub mod resample;

use chrono::{DateTime, Utc};
use meshtrack_core::config::{ParticleConfig, PredictionConfig};
use meshtrack_core::errors::PredictionError;
use meshtrack_core::geo::LocalFrame;
use meshtrack_core::models::{
    LocationPrediction, LocationSample, ModelPayload, MovementProfile, Particle, ParticleCloud,
    PeerFilterState, PeerLocationHistory, PredictionModel, VelocityVector,
};
use meshtrack_observability::events;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::{
    confidence_floor, heading_uncertainty_deg, is_stale, target_time, windowed_samples,
    LinearPredictor, PredictionDiagnostics,
};
use crate::motion::seconds_between;

pub use resample::systematic_resample;

const MODEL_NAME: &str = "PARTICLE_FILTER";

#[derive(Debug, Clone, Copy)]
pub struct ParticlePredictor {
    config: ParticleConfig,
    linear: LinearPredictor,
}

impl ParticlePredictor {
    pub fn new(config: ParticleConfig, linear: LinearPredictor) -> Self {
        Self { config, linear }
    }

    pub fn config(&self) -> &ParticleConfig {
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
        let window = match windowed_samples(
            history,
            config,
            PredictionModel::ParticleFilter,
            now,
            diagnostics,
        ) {
            Ok(window) => window,
            Err(insufficient) => return insufficient,
        };
        let peer_id = history.peer_id();
        let Some(&newest) = window.last() else {
            return self.linear.predict(history, config, &state.profile, now, diagnostics);
        };

        let population = self.config.particle_count.max(1);
        if state.particles.as_ref().is_some_and(|cloud| {
            cloud.len() != population
                || is_stale(cloud.last_update, newest.timestamp, now, config.max_history_age())
        }) {
            state.particles = None;
        }

        let profile = state.profile;
        let result = self
            .filter(peer_id, &window, state.particles.take(), &profile, diagnostics)
            .and_then(|cloud| {
                let prediction = self.project(&cloud, newest, config, &profile, now)?;
                Ok((cloud, prediction))
            });

        match result {
            Ok((cloud, prediction)) => {
                state.particles = Some(cloud);
                prediction
            }
            Err(err) => {
                events::fallback_to_linear(peer_id, MODEL_NAME, &err.to_string());
                diagnostics.push(err);
                diagnostics.fell_back = true;
                self.linear.extrapolate(peer_id, &window, config, &profile, now)
            }
        }
    }

    /// Assimilate every sample newer than the population.
    pub fn filter(
        &self,
        peer_id: &str,
        window: &[&LocationSample],
        cloud: Option<ParticleCloud>,
        profile: &MovementProfile,
        diagnostics: &mut PredictionDiagnostics,
    ) -> Result<ParticleCloud, PredictionError> {
        let mut cloud = cloud;
        for &sample in window {
            cloud = Some(match cloud {
                Some(current) if sample.timestamp <= current.last_update => current,
                Some(current) => self.step(peer_id, current, sample, profile, diagnostics),
                None => self.seed(sample, profile),
            });
        }
        let cloud = cloud.ok_or_else(|| numerical_failure("no samples to filter"))?;
        if cloud.particles.iter().all(Particle::is_finite) {
            Ok(cloud)
        } else {
            Err(numerical_failure("non-finite particle state"))
        }
    }

    /// Fresh population around `sample` with uniform weights.
    pub fn seed(&self, sample: &LocationSample, profile: &MovementProfile) -> ParticleCloud {
        let seed = peer_seed(&sample.peer_id, self.config.seed)
            ^ sample.timestamp.timestamp_millis() as u64;
        let mut rng = StdRng::seed_from_u64(seed);
        let frame = LocalFrame::new(sample.point());
        let position_std = self.reported_accuracy(sample);
        let velocity_std = profile.pattern.seed_velocity_std_mps();

        let count = self.config.particle_count.max(1);
        let weight = 1.0 / count as f64;
        let particles = (0..count)
            .map(|_| {
                let point = frame.to_geodetic(
                    gaussian(&mut rng) * position_std,
                    gaussian(&mut rng) * position_std,
                );
                Particle {
                    latitude: point.latitude,
                    longitude: point.longitude,
                    velocity_east_mps: gaussian(&mut rng) * velocity_std,
                    velocity_north_mps: gaussian(&mut rng) * velocity_std,
                    weight,
                    log_weight: weight.ln(),
                }
            })
            .collect();

        ParticleCloud {
            particles,
            last_update: sample.timestamp,
            rng_seed: rng.gen(),
        }
    }

    /// Propagate to `sample`, reweight, and resample if degenerate.
    fn step(
        &self,
        peer_id: &str,
        cloud: ParticleCloud,
        sample: &LocationSample,
        profile: &MovementProfile,
        diagnostics: &mut PredictionDiagnostics,
    ) -> ParticleCloud {
        let mut rng = StdRng::seed_from_u64(cloud.rng_seed);
        let dt = seconds_between(cloud.last_update, sample.timestamp).max(0.0);
        let mut particles = cloud.particles;
        propagate(&mut particles, dt, profile, &mut rng);

        let sigma = self.observation_std(sample);
        let frame = LocalFrame::new(sample.point());
        for particle in particles.iter_mut() {
            let (east, north) = frame.to_local(particle.point());
            particle.log_weight += -0.5 * (east * east + north * north) / (sigma * sigma);
        }

        let threshold = self.config.resample_threshold * particles.len() as f64;
        if !normalize_log_weights(&mut particles) {
            // Nothing explains the sample (e.g. a jump); start over around it.
            events::particle_degeneracy(peer_id, 0.0, threshold);
            diagnostics.push(PredictionError::ParticleDegeneracy {
                effective_sample_size: 0.0,
                threshold,
            });
            return self.seed(sample, profile);
        }

        let mut cloud = ParticleCloud {
            particles,
            last_update: sample.timestamp,
            rng_seed: 0,
        };
        let ess = cloud.effective_sample_size();
        if ess < threshold {
            events::particle_degeneracy(peer_id, ess, threshold);
            diagnostics.push(PredictionError::ParticleDegeneracy {
                effective_sample_size: ess,
                threshold,
            });
            diagnostics.resamples += 1;
            cloud.particles = self.resample(&cloud.particles, &mut rng);
        }
        cloud.rng_seed = rng.gen();
        cloud
    }

    /// Systematic resample with roughening; weights reset to uniform.
    fn resample(&self, particles: &[Particle], rng: &mut StdRng) -> Vec<Particle> {
        let weights: Vec<f64> = particles.iter().map(|p| p.weight).collect();
        let weight = 1.0 / particles.len().max(1) as f64;
        let roughening = self.config.roughening_m;

        systematic_resample(&weights, rng)
            .into_iter()
            .map(|index| {
                let mut particle = particles[index];
                if roughening > 0.0 {
                    let moved = LocalFrame::new(particle.point()).to_geodetic(
                        gaussian(rng) * roughening,
                        gaussian(rng) * roughening,
                    );
                    particle.latitude = moved.latitude;
                    particle.longitude = moved.longitude;
                }
                particle.weight = weight;
                particle.log_weight = weight.ln();
                particle
            })
            .collect()
    }

    fn project(
        &self,
        cloud: &ParticleCloud,
        newest: &LocationSample,
        config: &PredictionConfig,
        profile: &MovementProfile,
        now: DateTime<Utc>,
    ) -> Result<LocationPrediction, PredictionError> {
        let target = target_time(Some(newest.timestamp), now, config);
        let dt = seconds_between(cloud.last_update, target).max(0.0);

        // Projection draws from its own stream so the stored cloud is untouched.
        let mut rng = StdRng::seed_from_u64(cloud.rng_seed ^ target.timestamp_millis() as u64);
        let mut projected = cloud.clone();
        propagate(&mut projected.particles, dt, profile, &mut rng);
        projected.last_update = target;

        let frame = LocalFrame::new(newest.point());
        let estimate = CloudEstimate::of(&projected.particles, &frame)
            .ok_or_else(|| numerical_failure("projected population has no finite estimate"))?;

        let own = 1.0 - estimate.spread_m / self.config.confidence_spread_ceiling_m;
        let elapsed = seconds_between(newest.timestamp, target).max(0.0);
        let floor = confidence_floor(self.linear.confidence(elapsed, profile.noise_scale));
        let confidence = own.clamp(0.0, 1.0).max(floor).clamp(0.0, 1.0);

        let heading_uncertainty = heading_uncertainty_deg(
            estimate.velocity_east_mps,
            estimate.velocity_north_mps,
            estimate.velocity_covariance,
        );

        Ok(LocationPrediction {
            peer_id: newest.peer_id.clone(),
            predicted_location: frame.to_geodetic(estimate.east_m, estimate.north_m),
            made_at: now,
            target_timestamp: target,
            confidence,
            velocity: Some(VelocityVector::from_components(
                estimate.velocity_east_mps,
                estimate.velocity_north_mps,
                heading_uncertainty,
            )),
            model: PredictionModel::ParticleFilter,
            payload: Some(ModelPayload::Particles(projected)),
        })
    }

    /// Reported accuracy, or `default_accuracy_m` when the sample has none.
    pub fn reported_accuracy(&self, sample: &LocationSample) -> f64 {
        sample
            .accuracy_m
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(self.config.default_accuracy_m)
    }

    /// Likelihood std: reported accuracy, never tighter than half the default.
    fn observation_std(&self, sample: &LocationSample) -> f64 {
        let floor = (self.config.default_accuracy_m * 0.5).max(1.0);
        self.reported_accuracy(sample).max(floor)
    }
}

/// Weighted mean, spread, and velocity statistics of a population in a local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudEstimate {
    pub east_m: f64,
    pub north_m: f64,
    /// sqrt of the weighted mean squared distance from the mean position.
    pub spread_m: f64,
    pub velocity_east_mps: f64,
    pub velocity_north_mps: f64,
    pub velocity_covariance: [[f64; 2]; 2],
}

impl CloudEstimate {
    pub fn of(particles: &[Particle], frame: &LocalFrame) -> Option<Self> {
        let total: f64 = particles.iter().map(|p| p.weight).sum();
        if !(total.is_finite() && total > 0.0) {
            return None;
        }
        let local: Vec<(f64, f64, f64, &Particle)> = particles
            .iter()
            .map(|p| {
                let (east, north) = frame.to_local(p.point());
                (p.weight / total, east, north, p)
            })
            .collect();

        let (mut east, mut north, mut ve, mut vn) = (0.0, 0.0, 0.0, 0.0);
        for &(w, e, n, p) in &local {
            east += w * e;
            north += w * n;
            ve += w * p.velocity_east_mps;
            vn += w * p.velocity_north_mps;
        }

        let mut position_var = 0.0;
        let mut cov = [[0.0; 2]; 2];
        for &(w, e, n, p) in &local {
            position_var += w * ((e - east).powi(2) + (n - north).powi(2));
            let (de, dn) = (p.velocity_east_mps - ve, p.velocity_north_mps - vn);
            cov[0][0] += w * de * de;
            cov[0][1] += w * de * dn;
            cov[1][1] += w * dn * dn;
        }
        cov[1][0] = cov[0][1];

        let estimate = Self {
            east_m: east,
            north_m: north,
            spread_m: position_var.max(0.0).sqrt(),
            velocity_east_mps: ve,
            velocity_north_mps: vn,
            velocity_covariance: cov,
        };
        let finite = [east, north, estimate.spread_m, ve, vn]
            .iter()
            .chain(cov.iter().flatten())
            .all(|v| v.is_finite());
        finite.then_some(estimate)
    }
}

/// Normalize accumulated log-weights in place.
///
/// Subtracts the maximum before exponentiating. Returns `false` and resets
/// to uniform weights when no particle carries a finite weight.
pub fn normalize_log_weights(particles: &mut [Particle]) -> bool {
    if particles.is_empty() {
        return true;
    }
    let max = particles
        .iter()
        .map(|p| p.log_weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let total: f64 = particles.iter().map(|p| (p.log_weight - max).exp()).sum();

    if !(max.is_finite() && total.is_finite() && total > 0.0) {
        let weight = 1.0 / particles.len() as f64;
        for particle in particles.iter_mut() {
            particle.weight = weight;
            particle.log_weight = weight.ln();
        }
        return false;
    }

    let log_total = total.ln();
    for particle in particles.iter_mut() {
        particle.log_weight = particle.log_weight - max - log_total;
        particle.weight = particle.log_weight.exp();
    }
    true
}

/// Velocity random walk scaled by pattern and noise scale, then drift.
pub fn propagate<R: Rng + ?Sized>(
    particles: &mut [Particle],
    dt: f64,
    profile: &MovementProfile,
    rng: &mut R,
) {
    if dt <= 0.0 {
        return;
    }
    let jitter = profile.pattern.velocity_jitter_mps() * profile.noise_scale * dt.sqrt();
    for particle in particles.iter_mut() {
        particle.velocity_east_mps += gaussian(rng) * jitter;
        particle.velocity_north_mps += gaussian(rng) * jitter;
        let moved = LocalFrame::new(particle.point()).to_geodetic(
            particle.velocity_east_mps * dt,
            particle.velocity_north_mps * dt,
        );
        particle.latitude = moved.latitude;
        particle.longitude = moved.longitude;
    }
}

/// Per-peer RNG seed: blake3 of the peer id, mixed with the configured seed.
pub fn peer_seed(peer_id: &str, seed: Option<u64>) -> u64 {
    let hash = blake3::hash(peer_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes) ^ seed.unwrap_or(0)
}

fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample::<f64, _>(StandardNormal)
}

fn numerical_failure(detail: &str) -> PredictionError {
    PredictionError::NumericalFailure {
        model: MODEL_NAME.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(log_weight: f64) -> Particle {
        Particle {
            latitude: 0.0,
            longitude: 0.0,
            velocity_east_mps: 0.0,
            velocity_north_mps: 0.0,
            weight: 0.0,
            log_weight,
        }
    }

    #[test]
    fn normalization_survives_huge_negative_logs() {
        let mut particles = vec![particle(-1000.0), particle(-1001.0), particle(-1002.0)];
        assert!(normalize_log_weights(&mut particles));
        let sum: f64 = particles.iter().map(|p| p.weight).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(particles[0].weight > particles[1].weight);
        assert!(particles.iter().all(|p| p.weight > 0.0));
    }

    #[test]
    fn normalization_resets_when_all_weights_vanish() {
        let mut particles = vec![particle(f64::NEG_INFINITY), particle(f64::NAN)];
        assert!(!normalize_log_weights(&mut particles));
        assert!(particles.iter().all(|p| (p.weight - 0.5).abs() < 1e-12));
    }

    #[test]
    fn peer_seed_is_stable_and_distinct() {
        assert_eq!(peer_seed("alpha", None), peer_seed("alpha", None));
        assert_ne!(peer_seed("alpha", None), peer_seed("bravo", None));
        assert_ne!(peer_seed("alpha", None), peer_seed("alpha", Some(9)));
    }

    #[test]
    fn rng_sample_is_standard_normal() {
        let mut rng = StdRng::seed_from_u64(5);
        let draws: Vec<f64> = (0..4000).map(|_| gaussian(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.1);
        assert!((var - 1.0).abs() < 0.1);
    }
}
