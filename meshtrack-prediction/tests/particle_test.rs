use meshtrack_core::config::{ParticleConfig, PredictionConfig, TrackingConfig};
use meshtrack_core::geo::{destination, haversine_distance_m, LocalFrame};
use meshtrack_core::models::{
    LocationSample, MovementProfile, PeerFilterState, PeerLocationHistory, PredictionModel,
};
use meshtrack_core::traits::ILocationPredictor;
use meshtrack_prediction::predictors::particle::{peer_seed, CloudEstimate};
use meshtrack_prediction::{MovementClassifier, PredictionDiagnostics, Predictor};
use test_fixtures::{epoch, highway_track, history_from, last_time, stationary_jitter};

fn particle_with(particle: ParticleConfig) -> Predictor {
    let config = TrackingConfig {
        particle,
        ..TrackingConfig::default()
    };
    Predictor::from_config(PredictionModel::ParticleFilter, &config)
}

fn seeded(seed: u64) -> Predictor {
    particle_with(ParticleConfig {
        seed: Some(seed),
        ..ParticleConfig::default()
    })
}

fn config(horizon_minutes: f64) -> PredictionConfig {
    PredictionConfig {
        horizon_minutes,
        ..PredictionConfig::default()
    }
}

fn classified(history: &PeerLocationHistory) -> PeerFilterState {
    PeerFilterState::with_profile(MovementClassifier::default().classify(history))
}

#[test]
fn follows_a_highway_track() {
    let samples = highway_track("car", 30, epoch());
    let now = last_time(&samples);
    let last = samples.last().unwrap().point();
    let history = history_from("car", samples);
    let mut state = classified(&history);

    let prediction = seeded(7).predict(&history, &config(1.0), &mut state, now);

    assert_eq!(prediction.model, PredictionModel::ParticleFilter);
    let expected = destination(last, 90.0, 30.0 * 60.0);
    let miss = haversine_distance_m(prediction.predicted_location, expected);
    assert!(miss < 1_000.0, "missed by {miss} m");
    assert!(prediction.predicted_location.longitude > last.longitude);
    assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);
}

#[test]
fn weights_stay_normalized_and_population_fixed() {
    let samples = highway_track("car", 20, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);
    let mut state = classified(&history);

    seeded(1).predict(&history, &config(5.0), &mut state, now);

    let cloud = state.particles.as_ref().expect("cloud stored");
    assert_eq!(cloud.len(), ParticleConfig::default().particle_count);
    assert!((cloud.weight_sum() - 1.0).abs() < 1e-9);
    assert!(cloud.particles.iter().all(|p| p.is_finite() && p.weight >= 0.0));
    assert_eq!(cloud.last_update, now);
    assert!(state.kalman.is_none());
}

#[test]
fn projected_cloud_is_returned_at_target_time() {
    let samples = highway_track("car", 10, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);
    let mut state = classified(&history);

    let prediction = seeded(1).predict(&history, &config(5.0), &mut state, now);

    let projected = prediction.particle_cloud().expect("payload");
    assert_eq!(projected.last_update, prediction.target_timestamp);
    assert_eq!(projected.len(), state.particles.as_ref().unwrap().len());
    assert!((projected.weight_sum() - 1.0).abs() < 1e-9);
}

#[test]
fn seeded_runs_are_reproducible() {
    let samples = highway_track("car", 15, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);

    let mut a = classified(&history);
    let mut b = classified(&history);
    let first = seeded(42).predict(&history, &config(5.0), &mut a, now);
    let second = seeded(42).predict(&history, &config(5.0), &mut b, now);

    assert_eq!(first, second);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_draw_different_populations() {
    let samples = highway_track("car", 5, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);

    let mut a = classified(&history);
    let mut b = classified(&history);
    seeded(1).predict(&history, &config(5.0), &mut a, now);
    seeded(2).predict(&history, &config(5.0), &mut b, now);

    assert_ne!(a.particles, b.particles);
    assert_ne!(peer_seed("car", Some(1)), peer_seed("car", Some(2)));
}

#[test]
fn repeated_call_without_new_samples_is_idempotent() {
    let samples = highway_track("car", 12, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);
    let predictor = seeded(3);
    let mut state = classified(&history);

    let first = predictor.predict(&history, &config(5.0), &mut state, now);
    let stored = state.particles.clone();
    let second = predictor.predict(&history, &config(5.0), &mut state, now);

    assert_eq!(first, second);
    assert_eq!(state.particles, stored);
}

#[test]
fn tight_observations_trigger_resampling() {
    let samples = highway_track("car", 20, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);
    let mut state = classified(&history);
    let mut diagnostics = PredictionDiagnostics::default();

    seeded(9).predict_with_diagnostics(&history, &config(5.0), &mut state, now, &mut diagnostics);

    assert!(diagnostics.resamples > 0);
    assert!(!diagnostics.fell_back);
    // Resampling is reported, so the run is not clean.
    assert!(!diagnostics.is_clean());
}

#[test]
fn population_size_change_reseeds() {
    let samples = highway_track("car", 8, epoch());
    let now = last_time(&samples);
    let history = history_from("car", samples);
    let mut state = classified(&history);

    seeded(1).predict(&history, &config(5.0), &mut state, now);
    let smaller = particle_with(ParticleConfig {
        particle_count: 64,
        seed: Some(1),
        ..ParticleConfig::default()
    });
    smaller.predict(&history, &config(5.0), &mut state, now);

    assert_eq!(state.particles.unwrap().len(), 64);
}

#[test]
fn stationary_peer_stays_close() {
    let samples = stationary_jitter("van", 20, epoch());
    let now = last_time(&samples);
    let last = samples.last().unwrap().point();
    let history = history_from("van", samples);
    let mut state = classified(&history);

    let prediction = seeded(5).predict(&history, &config(5.0), &mut state, now);

    assert!(haversine_distance_m(prediction.predicted_location, last) < 100.0);
}

#[test]
fn insufficient_history_leaves_state_empty() {
    let history = history_from("car", vec![LocationSample::new("car", 1.0, 2.0, epoch())]);
    let mut state = PeerFilterState::default();

    let prediction = seeded(1).predict(&history, &config(5.0), &mut state, epoch());

    assert_eq!(prediction.confidence, 0.0);
    assert!(state.particles.is_none());
}

#[test]
fn seed_spread_follows_reported_accuracy() {
    let Predictor::ParticleFilter(particle) = seeded(3) else {
        panic!("expected the particle predictor");
    };
    let profile = MovementProfile::unknown(1.0, 1);
    let spread_for = |accuracy_m: f64| {
        let sample = LocationSample::new("dot", 60.16, 24.95, epoch()).with_accuracy(accuracy_m);
        assert_eq!(particle.reported_accuracy(&sample), accuracy_m);
        let cloud = particle.seed(&sample, &profile);
        let frame = LocalFrame::new(sample.point());
        CloudEstimate::of(&cloud.particles, &frame).unwrap().spread_m
    };

    // Radial RMS of a 2-D Gaussian is sqrt(2) times the per-axis std.
    let tight = spread_for(1.0);
    assert!(tight > 1.0 && tight < 2.0, "tight spread {tight}");
    let loose = spread_for(40.0);
    assert!(loose > 45.0 && loose < 70.0, "loose spread {loose}");

    let unreported = LocationSample::new("dot", 60.16, 24.95, epoch());
    assert_eq!(
        particle.reported_accuracy(&unreported),
        ParticleConfig::default().default_accuracy_m
    );
}
