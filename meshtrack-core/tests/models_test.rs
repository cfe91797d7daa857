use chrono::{Duration, TimeZone, Utc};
use meshtrack_core::config::HistoryConfig;
use meshtrack_core::errors::HistoryError;
use meshtrack_core::models::*;

fn t(secs: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

fn sample(peer: &str, lat: f64, secs: i64) -> LocationSample {
    LocationSample::new(peer, lat, 10.0, t(secs))
}

#[test]
fn sample_validation_rejects_bad_input() {
    assert!(sample("a", 45.0, 0).validate().is_ok());
    assert!(sample("a", 91.0, 0).validate().is_err());
    assert!(LocationSample::new("a", f64::NAN, 0.0, t(0)).validate().is_err());
    assert!(sample("", 0.0, 0).validate().is_err());
    assert!(sample("a", 0.0, 0).with_accuracy(-1.0).validate().is_err());
}

#[test]
fn from_millis_matches_chrono() {
    let s = LocationSample::from_millis("a", 1.0, 2.0, 1_704_067_200_000, Some(3.0)).unwrap();
    assert_eq!(s.timestamp, t(0));
    assert_eq!(s.accuracy_m, Some(3.0));
    assert!(LocationSample::from_millis("a", 1.0, 2.0, i64::MAX, None).is_none());
}

#[test]
fn history_rejects_out_of_order_samples() {
    let bounds = HistoryConfig::default();
    let mut history = PeerLocationHistory::new("a");
    history.push(sample("a", 1.0, 10), &bounds).unwrap();
    let err = history.push(sample("a", 1.0, 5), &bounds).unwrap_err();
    assert!(matches!(err, HistoryError::StaleSample { .. }));
    assert_eq!(history.len(), 1);

    // Equal timestamps are allowed.
    history.push(sample("a", 1.1, 10), &bounds).unwrap();
    assert_eq!(history.len(), 2);
}

#[test]
fn history_rejects_foreign_peer() {
    let mut history = PeerLocationHistory::new("a");
    let err = history
        .push(sample("b", 1.0, 0), &HistoryConfig::default())
        .unwrap_err();
    assert!(matches!(err, HistoryError::InvalidSample { .. }));
}

#[test]
fn history_enforces_count_bound() {
    let bounds = HistoryConfig {
        max_samples_per_peer: 3,
        ..HistoryConfig::default()
    };
    let mut history = PeerLocationHistory::new("a");
    let mut evicted = 0;
    for i in 0..5 {
        evicted += history.push(sample("a", i as f64, i), &bounds).unwrap();
    }
    assert_eq!(evicted, 2);
    assert_eq!(history.len(), 3);
    assert_eq!(history.oldest().unwrap().timestamp, t(2));
}

#[test]
fn history_enforces_age_bound() {
    let bounds = HistoryConfig {
        retention_minutes: 1.0,
        ..HistoryConfig::default()
    };
    let mut history = PeerLocationHistory::new("a");
    history.push(sample("a", 0.0, 0), &bounds).unwrap();
    history.push(sample("a", 0.0, 30), &bounds).unwrap();
    let evicted = history.push(sample("a", 0.0, 90), &bounds).unwrap();
    assert_eq!(evicted, 1);
    assert_eq!(history.oldest().unwrap().timestamp, t(30));
}

#[test]
fn from_samples_keeps_everything_push_bounds() {
    let bounds = HistoryConfig::default();
    let count = bounds.max_samples_per_peer + 50;
    // One sample a minute, spanning well past the retention window.
    let samples: Vec<_> = (0..count as i64).map(|i| sample("a", 0.0, i * 60)).collect();

    let unbounded = PeerLocationHistory::from_samples("a", samples.clone()).unwrap();
    assert_eq!(unbounded.len(), count);
    assert_eq!(unbounded.oldest().unwrap().timestamp, t(0));

    let mut bounded = PeerLocationHistory::new("a");
    for s in samples {
        bounded.push(s, &bounds).unwrap();
    }
    assert!(bounded.len() <= bounds.max_samples_per_peer);
    assert!(bounded.oldest().unwrap().timestamp > t(0));
}

#[test]
fn window_is_relative_to_now() {
    let history = PeerLocationHistory::from_samples(
        "a",
        (0..10).map(|i| sample("a", 0.0, i * 60)),
    )
    .unwrap();
    let recent: Vec<_> = history.window(Duration::minutes(3), t(540)).collect();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0].timestamp, t(360));
    assert_eq!(history.window(Duration::minutes(3), t(10_000)).count(), 0);
}

#[test]
fn prediction_model_parses_aliases() {
    assert_eq!("KALMAN".parse::<PredictionModel>().unwrap(), PredictionModel::KalmanFilter);
    assert_eq!("LINEAR".parse::<PredictionModel>().unwrap(), PredictionModel::Linear);
    assert!("kalman-ish".parse::<PredictionModel>().is_err());
    for model in PredictionModel::ALL {
        assert_eq!(PredictionModel::from_index(model.index()), Some(model));
    }
}

#[test]
fn insufficient_prediction_has_zero_confidence() {
    let p = LocationPrediction::insufficient(
        "a",
        PredictionModel::Linear,
        Some(GeoPoint::new(1.0, 2.0)),
        t(0),
        t(300),
    );
    assert_eq!(p.confidence, 0.0);
    assert!(!p.is_usable());
    assert_eq!(p.predicted_location, GeoPoint::new(1.0, 2.0));
    assert_eq!(p.lead_time(), Duration::minutes(5));
}

#[test]
fn prediction_serializes_with_tagged_payload() {
    let cloud = ParticleCloud {
        particles: vec![],
        last_update: t(0),
        rng_seed: 9,
    };
    let mut p = LocationPrediction::insufficient("a", PredictionModel::ParticleFilter, None, t(0), t(1));
    p.payload = Some(ModelPayload::Particles(cloud));
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["model"], "PARTICLE_FILTER");
    assert_eq!(json["payload"]["kind"], "particles");
    let back: LocationPrediction = serde_json::from_value(json).unwrap();
    assert_eq!(back, p);
}

#[test]
fn movement_profile_statistics() {
    let profile = MovementProfile {
        speed_variance: 4.0,
        mean_speed_mps: 10.0,
        heading_variance_deg2: 81.0,
        ..MovementProfile::default()
    };
    assert!((profile.speed_cv() - 0.2).abs() < 1e-12);
    assert!((profile.heading_std_deg() - 9.0).abs() < 1e-12);
    assert_eq!(MovementProfile::default().pattern, MovementPattern::Unknown);
}

#[test]
fn velocity_components() {
    let v = VelocityVector::new(10.0, 90.0, 5.0);
    assert!((v.east_mps() - 10.0).abs() < 1e-9);
    assert!(v.north_mps().abs() < 1e-9);
    let w = VelocityVector::from_components(0.0, -3.0, 1.0);
    assert!((w.heading_deg - 180.0).abs() < 1e-9);
    assert!((w.speed_mps - 3.0).abs() < 1e-12);
}

#[test]
fn particle_cloud_effective_sample_size() {
    let uniform = |n: usize| Particle {
        latitude: 0.0,
        longitude: 0.0,
        velocity_east_mps: 0.0,
        velocity_north_mps: 0.0,
        weight: 1.0 / n as f64,
        log_weight: (1.0 / n as f64).ln(),
    };
    let cloud = ParticleCloud {
        particles: vec![uniform(4); 4],
        last_update: t(0),
        rng_seed: 0,
    };
    assert!((cloud.effective_sample_size() - 4.0).abs() < 1e-9);
    assert!((cloud.weight_sum() - 1.0).abs() < 1e-12);
}

#[test]
fn point_cone_is_well_formed() {
    let cone = ConfidenceCone::point(GeoPoint::new(1.0, 1.0), 0.0);
    assert!(cone.is_well_formed());
    assert!(cone.is_widening());
    assert_eq!(cone.len(), 1);
}
