use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A geodetic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and within [-90, 90] × [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One position report for a peer, as delivered by the mesh transport.
///
/// Immutable once recorded: the history store only hands out shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub peer_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Reported horizontal accuracy (1σ), meters.
    pub accuracy_m: Option<f64>,
}

impl LocationSample {
    pub fn new(
        peer_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            peer_id: peer_id.into(),
            latitude,
            longitude,
            timestamp,
            accuracy_m: None,
        }
    }

    /// Build from the transport's millisecond epoch timestamp.
    /// Returns `None` when the timestamp is out of chrono's range.
    pub fn from_millis(
        peer_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp_millis: i64,
        accuracy_m: Option<f64>,
    ) -> Option<Self> {
        let timestamp = Utc.timestamp_millis_opt(timestamp_millis).single()?;
        Some(Self {
            peer_id: peer_id.into(),
            latitude,
            longitude,
            timestamp,
            accuracy_m,
        })
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Check coordinates and accuracy. Returns the rejection reason.
    pub fn validate(&self) -> Result<(), String> {
        if self.peer_id.is_empty() {
            return Err("empty peer id".to_string());
        }
        if !self.point().is_valid() {
            return Err(format!(
                "coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            ));
        }
        if let Some(acc) = self.accuracy_m {
            if !acc.is_finite() || acc < 0.0 {
                return Err(format!("accuracy must be a non-negative finite number, got {acc}"));
            }
        }
        Ok(())
    }
}
