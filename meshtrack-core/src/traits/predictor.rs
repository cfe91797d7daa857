use chrono::{DateTime, Utc};

use crate::config::PredictionConfig;
use crate::models::{
    ConfidenceCone, LocationPrediction, PeerFilterState, PeerLocationHistory, PredictionModel,
};

/// The capability every motion model provides.
///
/// Implementations hold only configuration. All per-peer recursive state
/// lives in the caller-owned [`PeerFilterState`], so one predictor instance
/// serves every peer and peers never share mutable state.
pub trait ILocationPredictor: Send + Sync {
    /// Which model this is.
    fn model(&self) -> PredictionModel;

    /// Incorporate any samples in `history` newer than `state`, then project
    /// to `max(now, last sample) + horizon`.
    ///
    /// Never fails: too little history yields a zero-confidence prediction,
    /// numerical trouble yields a degraded one.
    fn predict(
        &self,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
        state: &mut PeerFilterState,
        now: DateTime<Utc>,
    ) -> LocationPrediction;

    /// Uncertainty envelope for a prediction this model produced.
    fn confidence_cone(
        &self,
        prediction: &LocationPrediction,
        history: &PeerLocationHistory,
        config: &PredictionConfig,
    ) -> ConfidenceCone;
}
