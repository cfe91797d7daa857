//! Span definitions per operation: ingest, predict, cone, batch recompute.

/// Create an ingest span for one incoming sample.
#[macro_export]
macro_rules! ingest_span {
    ($peer_id:expr) => {
        tracing::debug_span!("meshtrack.ingest", peer_id = %$peer_id)
    };
}

/// Create a prediction span.
#[macro_export]
macro_rules! predict_span {
    ($peer_id:expr, $model:expr) => {
        tracing::debug_span!("meshtrack.predict", peer_id = %$peer_id, model = %$model)
    };
}

/// Create a cone generation span.
#[macro_export]
macro_rules! cone_span {
    ($peer_id:expr, $model:expr) => {
        tracing::trace_span!("meshtrack.cone", peer_id = %$peer_id, model = %$model)
    };
}

/// Create a batch recompute span.
#[macro_export]
macro_rules! batch_span {
    ($peer_count:expr) => {
        tracing::info_span!("meshtrack.batch", peer_count = $peer_count)
    };
}
