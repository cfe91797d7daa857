use meshtrack_core::models::PredictionModel;
use meshtrack_observability::PredictionMetrics;

#[test]
fn counters_accumulate_per_model() {
    let metrics = PredictionMetrics::new();
    metrics.record_prediction(PredictionModel::Linear);
    metrics.record_prediction(PredictionModel::KalmanFilter);
    metrics.record_prediction(PredictionModel::KalmanFilter);
    metrics.record_fallback();
    metrics.record_evictions(3);

    assert_eq!(metrics.predictions_for(PredictionModel::KalmanFilter), 2);
    let snap = metrics.snapshot();
    assert_eq!(snap.linear_predictions, 1);
    assert_eq!(snap.kalman_predictions, 2);
    assert_eq!(snap.particle_predictions, 0);
    assert_eq!(snap.total_predictions(), 3);
    assert_eq!(snap.fallbacks, 1);
    assert_eq!(snap.peers_evicted, 3);
}

#[test]
fn reset_zeroes_everything() {
    let metrics = PredictionMetrics::new();
    metrics.record_sample_ingested();
    metrics.record_stale_sample();
    metrics.record_resample();
    metrics.reset();
    assert_eq!(metrics.snapshot(), Default::default());
}

#[test]
fn snapshot_serializes_to_json() {
    let metrics = PredictionMetrics::new();
    metrics.record_covariance_correction();
    let json = serde_json::to_value(metrics.snapshot()).unwrap();
    assert_eq!(json["covariance_corrections"], 1);
    assert_eq!(json["batches_cancelled"], 0);
}
