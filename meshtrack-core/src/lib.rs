//! # meshtrack-core
//!
//! Foundation crate for the meshtrack peer location prediction engine.
//! Defines all types, traits, errors, config, constants, and the geodesy
//! helpers shared by the history store, the predictors, and the cone
//! generator. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod geo;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{PredictionConfig, TrackingConfig};
pub use errors::{TrackingError, TrackingResult};
pub use models::{
    ConfidenceCone, GeoPoint, LocationPrediction, LocationSample, MovementPattern,
    MovementProfile, PeerFilterState, PeerLocationHistory, PredictionModel, VelocityVector,
};
