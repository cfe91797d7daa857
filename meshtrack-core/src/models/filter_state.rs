use serde::{Deserialize, Serialize};

use super::{KalmanState, MovementProfile, ParticleCloud};

/// Per-peer arena slot holding every model's recursive state.
///
/// Each model only touches its own field, so switching the active model
/// leaves the others intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerFilterState {
    /// Latest classifier output for the peer.
    pub profile: MovementProfile,
    pub kalman: Option<KalmanState>,
    pub particles: Option<ParticleCloud>,
}

impl PeerFilterState {
    pub fn with_profile(profile: MovementProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    /// Drop all recursive state, keeping the profile.
    pub fn reset(&mut self) {
        self.kalman = None;
        self.particles = None;
    }
}
