//! Prediction metrics.
//!
//! [`PredictionMetrics`] is a set of lock-free counters shared by every peer
//! pipeline; [`MetricsSnapshot`] is its serializable point-in-time view for
//! statistics tooling.

use std::sync::atomic::{AtomicU64, Ordering};

use meshtrack_core::models::PredictionModel;
use serde::Serialize;

/// Engine-wide counters.
#[derive(Debug, Default)]
pub struct PredictionMetrics {
    predictions: [AtomicU64; 3],
    samples_ingested: AtomicU64,
    stale_samples: AtomicU64,
    invalid_samples: AtomicU64,
    insufficient_history: AtomicU64,
    fallbacks: AtomicU64,
    covariance_corrections: AtomicU64,
    resamples: AtomicU64,
    peers_evicted: AtomicU64,
    batches_cancelled: AtomicU64,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_prediction(&self, model: PredictionModel) {
        self.predictions[model.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sample_ingested(&self) {
        self.samples_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_sample(&self) {
        self.stale_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_sample(&self) {
        self.invalid_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insufficient_history(&self) {
        self.insufficient_history.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_covariance_correction(&self) {
        self.covariance_corrections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resample(&self) {
        self.resamples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: usize) {
        self.peers_evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_batch_cancelled(&self) {
        self.batches_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn predictions_for(&self, model: PredictionModel) -> u64 {
        self.predictions[model.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            linear_predictions: self.predictions_for(PredictionModel::Linear),
            kalman_predictions: self.predictions_for(PredictionModel::KalmanFilter),
            particle_predictions: self.predictions_for(PredictionModel::ParticleFilter),
            samples_ingested: load(&self.samples_ingested),
            stale_samples: load(&self.stale_samples),
            invalid_samples: load(&self.invalid_samples),
            insufficient_history: load(&self.insufficient_history),
            fallbacks: load(&self.fallbacks),
            covariance_corrections: load(&self.covariance_corrections),
            resamples: load(&self.resamples),
            peers_evicted: load(&self.peers_evicted),
            batches_cancelled: load(&self.batches_cancelled),
        }
    }

    /// Zero every counter (useful for testing or periodic rotation).
    pub fn reset(&self) {
        for counter in self.predictions.iter().chain([
            &self.samples_ingested,
            &self.stale_samples,
            &self.invalid_samples,
            &self.insufficient_history,
            &self.fallbacks,
            &self.covariance_corrections,
            &self.resamples,
            &self.peers_evicted,
            &self.batches_cancelled,
        ]) {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of [`PredictionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub linear_predictions: u64,
    pub kalman_predictions: u64,
    pub particle_predictions: u64,
    pub samples_ingested: u64,
    pub stale_samples: u64,
    pub invalid_samples: u64,
    pub insufficient_history: u64,
    pub fallbacks: u64,
    pub covariance_corrections: u64,
    pub resamples: u64,
    pub peers_evicted: u64,
    pub batches_cancelled: u64,
}

impl MetricsSnapshot {
    pub fn total_predictions(&self) -> u64 {
        self.linear_predictions + self.kalman_predictions + self.particle_predictions
    }
}
