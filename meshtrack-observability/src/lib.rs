//! # meshtrack-observability
//!
//! Structured tracing setup, span and event definitions, prediction metrics,
//! and the degradation log for the meshtrack engine.
//!
//! Nothing here influences predictions; it only records what happened.

pub mod degradation;
pub mod metrics;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use metrics::{MetricsSnapshot, PredictionMetrics};
pub use tracing_setup::{events, init_tracing, init_tracing_with_filter};
