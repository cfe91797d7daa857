//! Error taxonomy. One enum per subsystem, aggregated by [`TrackingError`].
//!
//! Only history and config errors ever reach a caller. Prediction errors are
//! recorded, counted, and degraded into a lower-confidence or linear
//! prediction; `predict` always returns a value.

pub mod config_error;
pub mod history_error;
pub mod prediction_error;

pub use config_error::ConfigError;
pub use history_error::HistoryError;
pub use prediction_error::PredictionError;

/// Top-level error for the meshtrack engine.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type TrackingResult<T> = Result<T, TrackingError>;
