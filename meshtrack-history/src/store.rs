//! HistoryStore: concurrent per-peer histories via DashMap.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use meshtrack_core::config::HistoryConfig;
use meshtrack_core::errors::HistoryError;
use meshtrack_core::models::{LocationSample, PeerLocationHistory};
use meshtrack_observability::events;

/// Thread-safe location history store.
///
/// Each peer's history sits behind its own DashMap shard entry, so appends
/// for different peers do not contend beyond shard granularity.
pub struct HistoryStore {
    peers: DashMap<String, PeerLocationHistory>,
    config: HistoryConfig,
}

impl HistoryStore {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            peers: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Append a sample to its peer's history.
    ///
    /// Returns the number of old samples evicted by the count/age bounds.
    /// A sample older than the peer's newest one is rejected with
    /// [`HistoryError::StaleSample`] and the history is left unchanged.
    pub fn record(&self, sample: LocationSample) -> Result<usize, HistoryError> {
        if let Err(reason) = sample.validate() {
            events::sample_rejected(&sample.peer_id, &reason);
            return Err(HistoryError::InvalidSample {
                peer_id: sample.peer_id,
                reason,
            });
        }

        let peer_id = sample.peer_id.clone();
        let mut history = self
            .peers
            .entry(peer_id.clone())
            .or_insert_with(|| PeerLocationHistory::new(peer_id.clone()));

        match history.push(sample, &self.config) {
            Ok(evicted) => {
                if evicted > 0 {
                    tracing::trace!(peer_id = %peer_id, evicted, "history bounds enforced");
                }
                Ok(evicted)
            }
            Err(e) => {
                events::sample_rejected(&peer_id, &e.to_string());
                Err(e)
            }
        }
    }

    /// Snapshot of the samples no older than `max_age` before `now`.
    pub fn history_for(
        &self,
        peer_id: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<PeerLocationHistory> {
        self.peers.get(peer_id).and_then(|history| {
            PeerLocationHistory::from_samples(peer_id, history.window(max_age, now).cloned()).ok()
        })
    }

    /// Run `f` against a peer's full history without copying it.
    pub fn with_history<R>(
        &self,
        peer_id: &str,
        f: impl FnOnce(&PeerLocationHistory) -> R,
    ) -> Option<R> {
        self.peers.get(peer_id).map(|history| f(&history))
    }

    /// Full clone of a peer's history.
    pub fn snapshot(&self, peer_id: &str) -> Option<PeerLocationHistory> {
        self.peers.get(peer_id).map(|h| h.clone())
    }

    /// Evict peers with no sample within `max_age` of `now`, and trim
    /// surviving histories to the retention window. Returns evicted peer ids.
    pub fn prune(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<String> {
        let idle_cutoff = now.checked_sub_signed(max_age);
        let retention_cutoff = now.checked_sub_signed(self.config.retention());

        let mut evicted = Vec::new();
        self.peers.retain(|peer_id, history| {
            if let Some(cutoff) = retention_cutoff {
                history.evict_older_than(cutoff);
            }
            let alive = match (history.latest(), idle_cutoff) {
                (Some(latest), Some(cutoff)) => latest.timestamp >= cutoff,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !alive {
                evicted.push(peer_id.clone());
            }
            alive
        });

        for peer_id in &evicted {
            events::peer_evicted(peer_id);
        }
        evicted
    }

    /// Forget a peer entirely.
    pub fn forget(&self, peer_id: &str) -> Option<PeerLocationHistory> {
        self.peers.remove(peer_id).map(|(_, history)| history)
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    /// Number of known peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Total samples held across every peer.
    pub fn sample_count(&self) -> usize {
        self.peers.iter().map(|h| h.len()).sum()
    }

    /// All known peer ids.
    pub fn peer_ids(&self) -> Vec<String> {
        self.peers.iter().map(|r| r.key().clone()).collect()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
