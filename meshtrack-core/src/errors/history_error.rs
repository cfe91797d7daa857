use chrono::{DateTime, Utc};

/// Location history errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    /// Out-of-order sample. The sample is dropped and the history is unchanged.
    #[error("stale sample for peer {peer_id}: {timestamp} is older than last recorded {last_timestamp}")]
    StaleSample {
        peer_id: String,
        timestamp: DateTime<Utc>,
        last_timestamp: DateTime<Utc>,
    },

    #[error("invalid sample for peer {peer_id}: {reason}")]
    InvalidSample { peer_id: String, reason: String },

    #[error("unknown peer: {peer_id}")]
    UnknownPeer { peer_id: String },
}
