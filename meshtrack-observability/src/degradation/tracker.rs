//! Record every degradation event: peer, component, failure mode, fallback
//! used, timestamp, recovery status.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use meshtrack_core::models::DegradationEvent;
use serde::{Deserialize, Serialize};

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    /// Recovered to normal operation.
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Bounded log of degradation events; the oldest entry is dropped when full.
#[derive(Debug, Clone)]
pub struct DegradationTracker {
    events: VecDeque<TrackedDegradation>,
    capacity: usize,
}

impl DegradationTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a new degradation event.
    pub fn record(&mut self, event: DegradationEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
    }

    /// Mark every active degradation of `component` for `peer_id` as recovered.
    /// Returns how many were updated.
    pub fn mark_recovered(&mut self, peer_id: &str, component: &str, now: DateTime<Utc>) -> usize {
        let mut updated = 0;
        for tracked in self.events.iter_mut() {
            if tracked.event.peer_id == peer_id
                && tracked.event.component == component
                && tracked.recovery_status == RecoveryStatus::Active
            {
                tracked.recovery_status = RecoveryStatus::Recovered;
                tracked.recovered_at = Some(now);
                updated += 1;
            }
        }
        updated
    }

    /// Drop every event for a forgotten peer.
    pub fn forget_peer(&mut self, peer_id: &str) {
        self.events.retain(|t| t.event.peer_id != peer_id);
    }

    pub fn events(&self) -> impl Iterator<Item = &TrackedDegradation> {
        self.events.iter()
    }

    /// Active (unrecovered) degradations.
    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    /// Count events for `peer_id` at or after `since`.
    pub fn count_since(&self, peer_id: &str, since: DateTime<Utc>) -> usize {
        self.events
            .iter()
            .filter(|t| t.event.peer_id == peer_id && t.event.timestamp >= since)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::new(meshtrack_core::config::defaults::DEFAULT_DEGRADATION_LOG_CAPACITY)
    }
}
