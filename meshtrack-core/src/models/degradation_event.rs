use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A graceful degradation: what failed for which peer and what was used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub peer_id: String,
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}
