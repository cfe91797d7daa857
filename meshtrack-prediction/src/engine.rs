//! PredictionEngine: owns the history store, per-peer filter state, the
//! model selector, and the prediction cache.
//!
//! Per-peer work is serialized by a mutex around that peer's
//! [`PeerFilterState`]; different peers run fully in parallel. Lock order is
//! always peer state → history store → cache/degradation log.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use meshtrack_core::config::{PredictionConfig, TrackingConfig};
use meshtrack_core::errors::{ConfigError, HistoryError, PredictionError, TrackingResult};
use meshtrack_core::models::{
    ConfidenceCone, DegradationEvent, LocationPrediction, LocationSample, PeerFilterState,
    PeerLocationHistory, PredictionModel,
};
use meshtrack_core::traits::ILocationPredictor;
use meshtrack_history::HistoryStore;
use meshtrack_observability::{
    batch_span, cone_span, events, ingest_span, predict_span, DegradationTracker,
    PredictionMetrics, TrackedDegradation,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::batch::{BatchOutcome, CancelToken};
use crate::cache::PredictionCache;
use crate::classifier::MovementClassifier;
use crate::predictors::PredictionDiagnostics;
use crate::selector::PredictorSelector;

/// A prediction with the cone drawn from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    pub prediction: LocationPrediction,
    pub cone: ConfidenceCone,
}

pub struct PredictionEngine {
    history: HistoryStore,
    states: DashMap<String, Arc<Mutex<PeerFilterState>>>,
    selector: PredictorSelector,
    classifier: MovementClassifier,
    prediction_config: RwLock<PredictionConfig>,
    cache: PredictionCache,
    metrics: PredictionMetrics,
    degradations: Mutex<DegradationTracker>,
    reprojection_interval: Duration,
}

impl PredictionEngine {
    pub fn new(config: TrackingConfig) -> TrackingResult<Self> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &TrackingConfig) -> Self {
        Self {
            history: HistoryStore::new(config.history),
            states: DashMap::new(),
            selector: PredictorSelector::new(config),
            classifier: MovementClassifier::new(config.classifier),
            prediction_config: RwLock::new(config.prediction),
            cache: PredictionCache::new(
                config.engine.cache_max_entries,
                Duration::from_secs(config.engine.cache_ttl_secs),
            ),
            metrics: PredictionMetrics::new(),
            degradations: Mutex::new(DegradationTracker::new(
                config.engine.degradation_log_capacity,
            )),
            reprojection_interval: Duration::from_millis(config.engine.reprojection_interval_ms),
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn metrics(&self) -> &PredictionMetrics {
        &self.metrics
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    pub fn classifier(&self) -> &MovementClassifier {
        &self.classifier
    }

    pub fn active_model(&self) -> PredictionModel {
        self.selector.active_model()
    }

    pub fn reprojection_interval(&self) -> Duration {
        self.reprojection_interval
    }

    pub fn prediction_config(&self) -> PredictionConfig {
        *self
            .prediction_config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the per-call prediction parameters. Takes effect on the next
    /// prediction; cached results are dropped.
    pub fn set_prediction_config(&self, config: PredictionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self
            .prediction_config
            .write()
            .unwrap_or_else(PoisonError::into_inner) = config;
        self.cache.invalidate_all();
        Ok(())
    }

    /// Switch the model used for subsequent predictions. Per-peer state of
    /// every model is kept, so switching back resumes where it left off.
    pub fn set_active_model(&self, model: PredictionModel) -> PredictionModel {
        let previous = self.selector.set_active_model(model);
        if previous != model {
            self.cache.invalidate_all();
            events::model_switched(previous.as_str(), model.as_str());
        }
        previous
    }

    /// Ingest a sample stamped by the caller's clock.
    pub fn ingest(&self, sample: LocationSample) -> TrackingResult<Arc<PredictionOutput>> {
        self.ingest_at(sample, Utc::now())
    }

    /// Record `sample` and re-run the pipeline for its peer as of `now`.
    ///
    /// Stale or invalid samples are rejected with a [`HistoryError`] and
    /// leave the peer's history and filter state untouched.
    pub fn ingest_at(
        &self,
        sample: LocationSample,
        now: DateTime<Utc>,
    ) -> TrackingResult<Arc<PredictionOutput>> {
        let peer_id = sample.peer_id.clone();
        let _span = ingest_span!(peer_id).entered();

        self.with_state(&peer_id, |cell, state| -> TrackingResult<Arc<PredictionOutput>> {
            if let Err(err) = self.history.record(sample) {
                match err {
                    HistoryError::StaleSample { .. } => self.metrics.record_stale_sample(),
                    _ => self.metrics.record_invalid_sample(),
                }
                if !self.history.contains(&peer_id) {
                    self.detach(&peer_id, cell);
                }
                return Err(err.into());
            }
            self.metrics.record_sample_ingested();

            let history = self
                .history
                .snapshot(&peer_id)
                .ok_or_else(|| HistoryError::UnknownPeer {
                    peer_id: peer_id.clone(),
                })?;
            Ok(self.run_pipeline(&history, state, now))
        })
    }

    /// Latest prediction for `peer_id` as of `now`, from cache when fresh.
    pub fn prediction(&self, peer_id: &str, now: DateTime<Utc>) -> Option<Arc<PredictionOutput>> {
        if let Some(cached) = self.cache.get(peer_id, now) {
            return Some(cached);
        }
        self.refresh(peer_id, now)
    }

    pub fn cone(&self, peer_id: &str, now: DateTime<Utc>) -> Option<ConfidenceCone> {
        self.prediction(peer_id, now).map(|output| output.cone.clone())
    }

    /// Recompute `peer_id` as of `now`, bypassing the cache.
    pub fn refresh(&self, peer_id: &str, now: DateTime<Utc>) -> Option<Arc<PredictionOutput>> {
        if !self.history.contains(peer_id) {
            return None;
        }
        self.with_state(peer_id, |cell, state| {
            let Some(history) = self.history.snapshot(peer_id) else {
                self.detach(peer_id, cell);
                return None;
            };
            Some(self.run_pipeline(&history, state, now))
        })
    }

    /// Recompute every known peer in parallel. Peers not yet started when
    /// `cancel` fires are skipped.
    pub fn recompute_all(&self, now: DateTime<Utc>, cancel: &CancelToken) -> BatchOutcome {
        let peers = self.history.peer_ids();
        let total = peers.len();
        let _span = batch_span!(total).entered();

        let recomputed = peers
            .par_iter()
            .filter(|peer_id| !cancel.is_cancelled() && self.refresh(peer_id, now).is_some())
            .count();

        let cancelled = cancel.is_cancelled() && recomputed < total;
        if cancelled {
            self.metrics.record_batch_cancelled();
        }
        events::batch_completed(recomputed, total, cancelled);
        BatchOutcome {
            total,
            recomputed,
            cancelled,
        }
    }

    /// Evict peers idle past the retention window and trim old samples.
    /// Returns the evicted peer ids.
    pub fn prune(&self, now: DateTime<Utc>) -> Vec<String> {
        let max_age = self.prediction_config().max_history_age();
        let evicted = self.history.prune(now, max_age);
        if evicted.is_empty() {
            return evicted;
        }
        for peer_id in &evicted {
            self.drop_state(peer_id);
            self.cache.invalidate(peer_id);
        }
        let mut degradations = lock(&self.degradations);
        for peer_id in &evicted {
            degradations.forget_peer(peer_id);
        }
        self.metrics.record_evictions(evicted.len());
        evicted
    }

    /// Drop everything known about `peer_id`.
    pub fn forget(&self, peer_id: &str) -> bool {
        let known = self.history.forget(peer_id).is_some();
        self.drop_state(peer_id);
        self.cache.invalidate(peer_id);
        lock(&self.degradations).forget_peer(peer_id);
        known
    }

    /// Copy of the peer's recursive state, for inspection.
    pub fn peer_state(&self, peer_id: &str) -> Option<PeerFilterState> {
        let cell = self.states.get(peer_id).map(|entry| Arc::clone(entry.value()))?;
        let state = lock(&cell).clone();
        Some(state)
    }

    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        lock(&self.degradations).events().cloned().collect()
    }

    pub fn active_degradations(&self) -> Vec<TrackedDegradation> {
        lock(&self.degradations)
            .active_degradations()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run `f` holding the peer's state lock. A cell detached from the map
    /// while we waited for its lock is discarded and the lookup retried.
    fn with_state<R>(
        &self,
        peer_id: &str,
        f: impl FnOnce(&Arc<Mutex<PeerFilterState>>, &mut PeerFilterState) -> R,
    ) -> R {
        loop {
            let cell = self.state_cell(peer_id);
            let mut state = lock(&cell);
            if self.is_attached(peer_id, &cell) {
                return f(&cell, &mut *state);
            }
        }
    }

    fn is_attached(&self, peer_id: &str, cell: &Arc<Mutex<PeerFilterState>>) -> bool {
        self.states
            .get(peer_id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), cell))
    }

    /// Remove the peer's cell only if it is still `cell`.
    fn detach(&self, peer_id: &str, cell: &Arc<Mutex<PeerFilterState>>) {
        self.states
            .remove_if(peer_id, |_, current| Arc::ptr_eq(current, cell));
    }

    /// Remove the peer's state under its lock, unless an ingest revived the
    /// peer after its history was evicted.
    fn drop_state(&self, peer_id: &str) {
        let Some(cell) = self.states.get(peer_id).map(|entry| Arc::clone(entry.value())) else {
            return;
        };
        let _state = lock(&cell);
        if !self.history.contains(peer_id) {
            self.detach(peer_id, &cell);
        }
    }

    fn state_cell(&self, peer_id: &str) -> Arc<Mutex<PeerFilterState>> {
        if let Some(existing) = self.states.get(peer_id) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.states
                .entry(peer_id.to_string())
                .or_default()
                .value(),
        )
    }

    /// Classify, predict with the active model, draw the cone, and cache.
    fn run_pipeline(
        &self,
        history: &PeerLocationHistory,
        state: &mut PeerFilterState,
        now: DateTime<Utc>,
    ) -> Arc<PredictionOutput> {
        let config = self.prediction_config();
        let peer_id = history.peer_id();
        state.profile = self
            .classifier
            .classify_window(history, config.max_history_age(), now);

        let predictor = self.selector.current_predictor();
        let model = predictor.model();
        let mut diagnostics = PredictionDiagnostics::default();

        let prediction = {
            let _span = predict_span!(peer_id, model).entered();
            predictor.predict_with_diagnostics(history, &config, state, now, &mut diagnostics)
        };
        let cone = {
            let _span = cone_span!(peer_id, prediction.model).entered();
            predictor.confidence_cone(&prediction, history, &config)
        };

        self.record_outcome(model, &prediction, &diagnostics, now);
        let output = Arc::new(PredictionOutput { prediction, cone });
        self.cache.insert(peer_id.to_string(), Arc::clone(&output));
        output
    }

    fn record_outcome(
        &self,
        model: PredictionModel,
        prediction: &LocationPrediction,
        diagnostics: &PredictionDiagnostics,
        now: DateTime<Utc>,
    ) {
        self.metrics.record_prediction(prediction.model);
        for _ in 0..diagnostics.resamples {
            self.metrics.record_resample();
        }

        let peer_id = prediction.peer_id.as_str();
        let component = model.as_str();
        let mut degraded = Vec::new();
        for issue in &diagnostics.issues {
            match issue {
                PredictionError::InsufficientHistory { .. } => {
                    self.metrics.record_insufficient_history();
                }
                PredictionError::DegenerateCovariance { .. } => {
                    self.metrics.record_covariance_correction();
                    degraded.push((issue, "covariance symmetrized and clamped"));
                }
                PredictionError::ParticleDegeneracy {
                    effective_sample_size,
                    ..
                } => {
                    if *effective_sample_size < 1.0 {
                        degraded.push((issue, "population reseeded at sample"));
                    }
                }
                PredictionError::NumericalFailure { .. } => {
                    self.metrics.record_fallback();
                    degraded.push((issue, PredictionModel::Linear.as_str()));
                }
            }
        }

        let mut tracker = lock(&self.degradations);
        if degraded.is_empty() {
            if prediction.is_usable() {
                tracker.mark_recovered(peer_id, component, now);
            }
            return;
        }
        for (issue, fallback) in degraded {
            tracker.record(DegradationEvent {
                peer_id: peer_id.to_string(),
                component: component.to_string(),
                failure: issue.to_string(),
                fallback_used: fallback.to_string(),
                timestamp: now,
            });
        }
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::build(&TrackingConfig::default())
    }
}

/// Lock ignoring poisoning; a panic in one pipeline must not wedge the peer.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
