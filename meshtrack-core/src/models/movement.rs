use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::defaults::DEFAULT_UNKNOWN_NOISE_SCALE;

/// Movement classification derived from the recent history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementPattern {
    WalkingHiking,
    UrbanDriving,
    HighwayDriving,
    Boating,
    Stationary,
    Unknown,
}

impl MovementPattern {
    pub const ALL: [MovementPattern; 6] = [
        MovementPattern::WalkingHiking,
        MovementPattern::UrbanDriving,
        MovementPattern::HighwayDriving,
        MovementPattern::Boating,
        MovementPattern::Stationary,
        MovementPattern::Unknown,
    ];

    /// Process-noise multiplier before the erratic-motion factor is applied.
    pub fn base_noise_scale(self) -> f64 {
        match self {
            MovementPattern::Stationary => 0.25,
            MovementPattern::WalkingHiking => 1.0,
            MovementPattern::Boating => 1.25,
            MovementPattern::HighwayDriving => 1.5,
            MovementPattern::UrbanDriving => 2.0,
            MovementPattern::Unknown => DEFAULT_UNKNOWN_NOISE_SCALE,
        }
    }

    /// Velocity random-walk std (m/s per √s) the particle filter uses for this pattern.
    pub fn velocity_jitter_mps(self) -> f64 {
        match self {
            MovementPattern::Stationary => 0.02,
            MovementPattern::WalkingHiking => 0.15,
            MovementPattern::Boating => 0.2,
            MovementPattern::HighwayDriving => 0.4,
            MovementPattern::UrbanDriving => 0.6,
            MovementPattern::Unknown => 0.5,
        }
    }

    /// Velocity std used to seed a particle population with no motion evidence.
    pub fn seed_velocity_std_mps(self) -> f64 {
        match self {
            MovementPattern::Stationary => 0.2,
            MovementPattern::WalkingHiking => 1.5,
            MovementPattern::Boating => 5.0,
            MovementPattern::UrbanDriving => 8.0,
            MovementPattern::HighwayDriving => 15.0,
            MovementPattern::Unknown => 5.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementPattern::WalkingHiking => "WALKING_HIKING",
            MovementPattern::UrbanDriving => "URBAN_DRIVING",
            MovementPattern::HighwayDriving => "HIGHWAY_DRIVING",
            MovementPattern::Boating => "BOATING",
            MovementPattern::Stationary => "STATIONARY",
            MovementPattern::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MovementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output: the pattern, its noise scale, and the statistics it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProfile {
    pub pattern: MovementPattern,
    /// Multiplier on Kalman process noise and particle velocity jitter.
    pub noise_scale: f64,
    pub mean_speed_mps: f64,
    /// Population variance of per-step speeds, (m/s)².
    pub speed_variance: f64,
    /// Circular variance of per-step headings, deg².
    pub heading_variance_deg2: f64,
    /// Direct distance over path length, [0, 1].
    pub straightness: f64,
    pub sample_count: usize,
}

impl MovementProfile {
    /// Profile for a history too short to classify.
    pub fn unknown(noise_scale: f64, sample_count: usize) -> Self {
        Self {
            pattern: MovementPattern::Unknown,
            noise_scale,
            mean_speed_mps: 0.0,
            speed_variance: 0.0,
            heading_variance_deg2: 0.0,
            straightness: 0.0,
            sample_count,
        }
    }

    pub fn heading_std_deg(&self) -> f64 {
        self.heading_variance_deg2.max(0.0).sqrt()
    }

    /// Speed coefficient of variation; 0 when the peer is not moving.
    pub fn speed_cv(&self) -> f64 {
        if self.mean_speed_mps > f64::EPSILON {
            self.speed_variance.max(0.0).sqrt() / self.mean_speed_mps
        } else {
            0.0
        }
    }
}

impl Default for MovementProfile {
    fn default() -> Self {
        Self::unknown(DEFAULT_UNKNOWN_NOISE_SCALE, 0)
    }
}
