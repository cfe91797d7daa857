use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HistoryConfig;
use crate::errors::HistoryError;

use super::LocationSample;

/// Ordered location samples for one peer, newest last.
///
/// Timestamps are non-decreasing. Only the history store mutates a history;
/// predictors receive `&PeerLocationHistory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerLocationHistory {
    peer_id: String,
    samples: VecDeque<LocationSample>,
}

impl PeerLocationHistory {
    pub fn new(peer_id: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            samples: VecDeque::new(),
        }
    }

    /// Build a history from already-ordered samples, keeping all of them.
    /// Use [`push`](Self::push) for count and age bounds.
    pub fn from_samples(
        peer_id: impl Into<String>,
        samples: impl IntoIterator<Item = LocationSample>,
    ) -> Result<Self, HistoryError> {
        let mut history = Self::new(peer_id);
        for sample in samples {
            history.append(sample)?;
        }
        Ok(history)
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl DoubleEndedIterator<Item = &LocationSample> + ExactSizeIterator {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&LocationSample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&LocationSample> {
        self.samples.front()
    }

    /// Lazy view of the samples no older than `max_age` before `now`.
    pub fn window(
        &self,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> impl DoubleEndedIterator<Item = &LocationSample> + Clone {
        let start = match now.checked_sub_signed(max_age) {
            Some(cutoff) => self.samples.partition_point(|s| s.timestamp < cutoff),
            None => 0,
        };
        self.samples.range(start..)
    }

    /// Append a sample, then enforce the count and age bounds (oldest first).
    ///
    /// Rejects samples for another peer, invalid coordinates, and samples
    /// older than the newest recorded one.
    pub fn push(
        &mut self,
        sample: LocationSample,
        bounds: &HistoryConfig,
    ) -> Result<usize, HistoryError> {
        let newest = sample.timestamp;
        self.append(sample)?;

        let mut evicted = 0;
        while self.samples.len() > bounds.max_samples_per_peer.max(1) {
            self.samples.pop_front();
            evicted += 1;
        }
        if let Some(cutoff) = newest.checked_sub_signed(bounds.retention()) {
            evicted += self.evict_older_than(cutoff);
        }
        Ok(evicted)
    }

    fn append(&mut self, sample: LocationSample) -> Result<(), HistoryError> {
        if sample.peer_id != self.peer_id {
            return Err(HistoryError::InvalidSample {
                peer_id: self.peer_id.clone(),
                reason: format!("sample belongs to peer {}", sample.peer_id),
            });
        }
        sample
            .validate()
            .map_err(|reason| HistoryError::InvalidSample {
                peer_id: self.peer_id.clone(),
                reason,
            })?;
        if let Some(last) = self.samples.back() {
            if sample.timestamp < last.timestamp {
                return Err(HistoryError::StaleSample {
                    peer_id: self.peer_id.clone(),
                    timestamp: sample.timestamp,
                    last_timestamp: last.timestamp,
                });
            }
        }

        self.samples.push_back(sample);
        Ok(())
    }

    /// Drop samples strictly older than `cutoff`. Returns how many were removed.
    pub fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        while self.samples.front().is_some_and(|s| s.timestamp < cutoff) {
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }
}
