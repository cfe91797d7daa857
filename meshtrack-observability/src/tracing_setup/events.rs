//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// An incoming sample was dropped.
pub fn sample_rejected(peer_id: &str, reason: &str) {
    tracing::warn!(
        event = "sample_rejected",
        peer_id = %peer_id,
        reason = %reason,
        "sample rejected"
    );
}

/// A peer went silent for longer than the retention window and was forgotten.
pub fn peer_evicted(peer_id: &str) {
    tracing::info!(event = "peer_evicted", peer_id = %peer_id, "peer evicted");
}

/// The Kalman tangent plane moved to a new origin.
pub fn origin_reanchored(peer_id: &str, drift_m: f64) {
    tracing::debug!(
        event = "origin_reanchored",
        peer_id = %peer_id,
        drift_m = drift_m,
        "kalman origin re-anchored"
    );
}

/// A covariance matrix lost positive semi-definiteness and was repaired.
pub fn covariance_corrected(peer_id: &str, min_eigenvalue: f64) {
    tracing::warn!(
        event = "covariance_corrected",
        peer_id = %peer_id,
        min_eigenvalue = min_eigenvalue,
        "covariance symmetrized and clamped"
    );
}

/// The particle population collapsed and was resampled.
pub fn particle_degeneracy(peer_id: &str, effective_sample_size: f64, threshold: f64) {
    tracing::debug!(
        event = "particle_degeneracy",
        peer_id = %peer_id,
        effective_sample_size = effective_sample_size,
        threshold = threshold,
        "particle population resampled"
    );
}

/// A model failed numerically and the linear projection was used instead.
pub fn fallback_to_linear(peer_id: &str, model: &str, reason: &str) {
    tracing::warn!(
        event = "fallback_to_linear",
        peer_id = %peer_id,
        model = %model,
        reason = %reason,
        "falling back to linear prediction"
    );
}

/// The active model changed.
pub fn model_switched(from: &str, to: &str) {
    tracing::info!(event = "model_switched", from = %from, to = %to, "active model switched");
}

/// A batch recomputation finished or was cancelled.
pub fn batch_completed(recomputed: usize, total: usize, cancelled: bool) {
    if cancelled {
        tracing::info!(
            event = "batch_cancelled",
            recomputed = recomputed,
            total = total,
            "batch recompute cancelled"
        );
    } else {
        tracing::debug!(
            event = "batch_completed",
            recomputed = recomputed,
            total = total,
            "batch recompute completed"
        );
    }
}
