use chrono::Duration;
use meshtrack_core::config::{PredictionConfig, TrackingConfig};
use meshtrack_core::geo::destination;
use meshtrack_core::models::{LocationSample, PeerFilterState, PredictionModel};
use meshtrack_core::traits::ILocationPredictor;
use meshtrack_prediction::{MovementClassifier, Predictor};
use nalgebra::{Matrix4, SymmetricEigen};
use proptest::prelude::*;
use test_fixtures::{epoch, history_from, origin};

fn tracking() -> TrackingConfig {
    let mut config = TrackingConfig::default();
    config.particle.particle_count = 64;
    config.particle.seed = Some(17);
    config
}

/// A wandering track: each step has its own bearing and length.
fn wander(steps: &[(f64, f64)], interval_secs: i64) -> Vec<LocationSample> {
    let mut point = origin();
    let mut samples = Vec::with_capacity(steps.len() + 1);
    samples.push(LocationSample::new("p", point.latitude, point.longitude, epoch()));
    for (i, &(bearing, distance)) in steps.iter().enumerate() {
        point = destination(point, bearing, distance);
        let t = epoch() + Duration::seconds(interval_secs * (i as i64 + 1));
        samples.push(LocationSample::new("p", point.latitude, point.longitude, t));
    }
    samples
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn predictions_and_cones_are_well_formed(
        steps in prop::collection::vec((0.0f64..360.0, 0.0f64..400.0), 1..12),
        interval_secs in 5i64..60,
        horizon_minutes in 0.0f64..30.0,
    ) {
        let samples = wander(&steps, interval_secs);
        let now = samples.last().map(|s| s.timestamp).unwrap();
        let history = history_from("p", samples);
        let config = PredictionConfig {
            horizon_minutes,
            ..PredictionConfig::default()
        };
        let tracking = tracking();
        let profile = MovementClassifier::default().classify(&history);

        for model in PredictionModel::ALL {
            let predictor = Predictor::from_config(model, &tracking);
            let mut state = PeerFilterState::with_profile(profile);
            let prediction = predictor.predict(&history, &config, &mut state, now);

            prop_assert!((0.0..=1.0).contains(&prediction.confidence));
            prop_assert!(prediction.target_timestamp >= prediction.made_at);
            prop_assert!(prediction.predicted_location.is_valid());

            let cone = predictor.confidence_cone(&prediction, &history, &config);
            prop_assert!(cone.is_well_formed());
            prop_assert!(cone.is_widening(), "{model}: {:?}", cone.half_widths_m);
            prop_assert!(cone.half_widths_m.iter().all(|w| w.is_finite() && *w >= 0.0));
            prop_assert!((0.0..=1.0).contains(&cone.confidence_level));

            if let Some(track) = &state.kalman {
                prop_assert!(track.is_symmetric(1e-6));
                let min = SymmetricEigen::new(Matrix4::from_row_slice(&track.covariance))
                    .eigenvalues
                    .min();
                prop_assert!(min > -1e-6, "eigenvalue {min}");
            }
            if let Some(cloud) = &state.particles {
                prop_assert!((cloud.weight_sum() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn longer_horizon_never_raises_linear_confidence(
        steps in prop::collection::vec((0.0f64..360.0, 1.0f64..300.0), 2..8),
        short in 0.0f64..20.0,
        extra in 0.0f64..20.0,
    ) {
        let samples = wander(&steps, 20);
        let now = samples.last().map(|s| s.timestamp).unwrap();
        let history = history_from("p", samples);
        let predictor = Predictor::from_config(PredictionModel::Linear, &tracking());
        let at = |horizon_minutes: f64| {
            let config = PredictionConfig {
                horizon_minutes,
                ..PredictionConfig::default()
            };
            predictor
                .predict(&history, &config, &mut PeerFilterState::default(), now)
                .confidence
        };

        prop_assert!(at(short + extra) <= at(short));
    }
}
