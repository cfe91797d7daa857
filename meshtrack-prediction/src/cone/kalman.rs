//! Covariance cone: the track's position covariance is propagated to each
//! center-line time and its cross-track std, times the sigma multiplier,
//! is the half-width.

use meshtrack_core::config::ConeConfig;
use meshtrack_core::models::{ConfidenceCone, KalmanState, LocationPrediction};
use nalgebra::Vector2;

use super::geometry::{assemble_local, unit_direction, widen};
use crate::motion::seconds_between;
use crate::predictors::kalman::math;

pub fn cone(
    config: &ConeConfig,
    prediction: &LocationPrediction,
    track: &KalmanState,
) -> ConfidenceCone {
    let segments = config.segments.max(1);
    let frame = track.frame();
    let (x0, p0) = math::unpack(track);
    let horizon = seconds_between(track.last_update, prediction.target_timestamp).max(0.0);

    let mut centers = Vec::with_capacity(segments + 1);
    let mut directions = Vec::with_capacity(segments + 1);
    let mut widths = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let dt = horizon * i as f64 / segments as f64;
        let (x, p) = math::predict(&x0, &p0, dt, track.accel_std_mps2);
        let direction = unit_direction(x[2], x[3]).unwrap_or((1.0, 0.0));
        let cross_track = Vector2::new(-direction.1, direction.0);
        let spread = math::spread_along(&math::position_covariance(&p), cross_track);

        centers.push((x[0], x[1]));
        directions.push(direction);
        widths.push(config.sigma_multiplier * spread);
    }

    widen(&mut widths, config.min_half_width_m);
    assemble_local(&frame, &centers, &directions, widths, prediction.confidence)
}
