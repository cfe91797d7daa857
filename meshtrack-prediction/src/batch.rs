//! Cancellable whole-population recomputation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Cooperative cancellation flag shared between a batch and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Peers known when the batch started.
    pub total: usize,
    pub recomputed: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn skipped(&self) -> usize {
        self.total.saturating_sub(self.recomputed)
    }
}
