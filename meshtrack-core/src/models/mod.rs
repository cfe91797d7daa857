pub mod cone;
pub mod degradation_event;
pub mod filter_state;
pub mod history;
pub mod kalman_state;
pub mod location;
pub mod movement;
pub mod particle;
pub mod prediction;
pub mod velocity;

pub use cone::ConfidenceCone;
pub use degradation_event::DegradationEvent;
pub use filter_state::PeerFilterState;
pub use history::PeerLocationHistory;
pub use kalman_state::KalmanState;
pub use location::{GeoPoint, LocationSample};
pub use movement::{MovementPattern, MovementProfile};
pub use particle::{Particle, ParticleCloud};
pub use prediction::{LocationPrediction, ModelPayload, PredictionModel};
pub use velocity::VelocityVector;
