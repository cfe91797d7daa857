//! # meshtrack-prediction
//!
//! Movement classification, the three predictors (linear, Kalman, particle),
//! confidence cones, model selection, and the [`PredictionEngine`] that runs
//! the per-peer pipeline: ingest → classify → predict → cone.

pub mod batch;
pub mod cache;
pub mod classifier;
pub mod cone;
pub mod engine;
pub mod motion;
pub mod predictors;
pub mod scheduler;
pub mod selector;

pub use batch::{BatchOutcome, CancelToken};
pub use cache::PredictionCache;
pub use classifier::MovementClassifier;
pub use cone::ConeGenerator;
pub use engine::{PredictionEngine, PredictionOutput};
pub use predictors::{
    KalmanPredictor, LinearPredictor, ParticlePredictor, PredictionDiagnostics, Predictor,
};
pub use scheduler::spawn_reprojection;
pub use selector::PredictorSelector;
