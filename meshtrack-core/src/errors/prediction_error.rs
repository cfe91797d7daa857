/// Prediction-side failures. None of these escape `predict`; each one is
/// logged, counted, and turned into a degraded prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("insufficient history: {available} samples within window, {required} required")]
    InsufficientHistory { required: usize, available: usize },

    #[error("degenerate covariance corrected: {detail}")]
    DegenerateCovariance { detail: String },

    #[error("particle degeneracy: effective sample size {effective_sample_size:.1} below {threshold:.1}")]
    ParticleDegeneracy {
        effective_sample_size: f64,
        threshold: f64,
    },

    #[error("numerical failure in {model}: {detail}")]
    NumericalFailure { model: String, detail: String },
}
