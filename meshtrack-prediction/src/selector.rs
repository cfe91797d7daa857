//! Active-model selection.
//!
//! All three predictors are built once; switching only swaps an atomic
//! index, so a prediction already in flight keeps the predictor it started
//! with and no per-peer state is touched.

use std::sync::atomic::{AtomicUsize, Ordering};

use meshtrack_core::config::TrackingConfig;
use meshtrack_core::models::PredictionModel;

use crate::predictors::Predictor;

#[derive(Debug)]
pub struct PredictorSelector {
    predictors: [Predictor; 3],
    active: AtomicUsize,
}

impl PredictorSelector {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            predictors: PredictionModel::ALL.map(|model| Predictor::from_config(model, config)),
            active: AtomicUsize::new(config.engine.active_model.index()),
        }
    }

    pub fn active_model(&self) -> PredictionModel {
        PredictionModel::from_index(self.active.load(Ordering::Acquire))
            .unwrap_or(PredictionModel::KalmanFilter)
    }

    pub fn current_predictor(&self) -> &Predictor {
        self.predictor_for(self.active_model())
    }

    pub fn predictor_for(&self, model: PredictionModel) -> &Predictor {
        &self.predictors[model.index()]
    }

    /// Select `model` for subsequent predictions; returns the previous one.
    pub fn set_active_model(&self, model: PredictionModel) -> PredictionModel {
        let previous = self.active.swap(model.index(), Ordering::AcqRel);
        PredictionModel::from_index(previous).unwrap_or(model)
    }
}

impl Default for PredictorSelector {
    fn default() -> Self {
        Self::new(&TrackingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtrack_core::traits::ILocationPredictor;

    #[test]
    fn every_model_has_its_own_predictor() {
        let selector = PredictorSelector::default();
        for model in PredictionModel::ALL {
            assert_eq!(selector.predictor_for(model).model(), model);
        }
    }

    #[test]
    fn switching_returns_previous_model() {
        let selector = PredictorSelector::default();
        assert_eq!(selector.active_model(), PredictionModel::KalmanFilter);
        let previous = selector.set_active_model(PredictionModel::ParticleFilter);
        assert_eq!(previous, PredictionModel::KalmanFilter);
        assert_eq!(selector.current_predictor().model(), PredictionModel::ParticleFilter);
    }
}
