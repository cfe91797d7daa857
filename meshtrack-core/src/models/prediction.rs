use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

use super::{GeoPoint, KalmanState, ParticleCloud, VelocityVector};

/// The three interchangeable motion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionModel {
    Linear,
    KalmanFilter,
    ParticleFilter,
}

impl PredictionModel {
    pub const ALL: [PredictionModel; 3] = [
        PredictionModel::Linear,
        PredictionModel::KalmanFilter,
        PredictionModel::ParticleFilter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PredictionModel::Linear => "LINEAR",
            PredictionModel::KalmanFilter => "KALMAN_FILTER",
            PredictionModel::ParticleFilter => "PARTICLE_FILTER",
        }
    }

    /// Compact index, used for atomic storage of the active selection.
    pub fn index(self) -> usize {
        match self {
            PredictionModel::Linear => 0,
            PredictionModel::KalmanFilter => 1,
            PredictionModel::ParticleFilter => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for PredictionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "LINEAR" => Ok(PredictionModel::Linear),
            "KALMAN_FILTER" | "KALMAN" => Ok(PredictionModel::KalmanFilter),
            "PARTICLE_FILTER" | "PARTICLE" => Ok(PredictionModel::ParticleFilter),
            other => Err(ConfigError::InvalidValue {
                field: "engine.active_model".to_string(),
                reason: format!("unknown prediction model: {other}"),
            }),
        }
    }
}

/// Model-specific internals carried alongside a prediction, for cone generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum ModelPayload {
    /// Filtered track at its last measurement; cones project it forward.
    Kalman(KalmanState),
    /// Population propagated to the target time.
    Particles(ParticleCloud),
}

/// The single output contract shared by every predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPrediction {
    pub peer_id: String,
    pub predicted_location: GeoPoint,
    pub made_at: DateTime<Utc>,
    pub target_timestamp: DateTime<Utc>,
    /// Always within [0, 1].
    pub confidence: f64,
    pub velocity: Option<VelocityVector>,
    pub model: PredictionModel,
    pub payload: Option<ModelPayload>,
}

impl LocationPrediction {
    /// Zero-confidence placeholder for a peer without enough history.
    /// The location is the last known position, if any.
    pub fn insufficient(
        peer_id: impl Into<String>,
        model: PredictionModel,
        last_known: Option<GeoPoint>,
        made_at: DateTime<Utc>,
        target_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            peer_id: peer_id.into(),
            predicted_location: last_known.unwrap_or_default(),
            made_at,
            target_timestamp,
            confidence: 0.0,
            velocity: None,
            model,
            payload: None,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.confidence > 0.0
    }

    /// Time between when the prediction was made and the instant it targets.
    pub fn lead_time(&self) -> Duration {
        self.target_timestamp - self.made_at
    }

    pub fn kalman_state(&self) -> Option<&KalmanState> {
        match &self.payload {
            Some(ModelPayload::Kalman(state)) => Some(state),
            _ => None,
        }
    }

    pub fn particle_cloud(&self) -> Option<&ParticleCloud> {
        match &self.payload {
            Some(ModelPayload::Particles(cloud)) => Some(cloud),
            _ => None,
        }
    }
}
