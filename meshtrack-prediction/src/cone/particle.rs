//! Spread cone: particles are back-projected along their own velocities to
//! each center-line time; the weighted cross-track std of the population,
//! times the sigma multiplier, is the half-width.

use chrono::{DateTime, Utc};
use meshtrack_core::config::ConeConfig;
use meshtrack_core::geo::LocalFrame;
use meshtrack_core::models::{ConfidenceCone, LocationPrediction, ParticleCloud};

use super::geometry::{assemble_local, unit_direction, widen};
use crate::motion::seconds_between;

/// `cloud` is the population propagated to the prediction's target time;
/// `start` is when the center line begins.
pub fn cone(
    config: &ConeConfig,
    prediction: &LocationPrediction,
    cloud: &ParticleCloud,
    start: DateTime<Utc>,
) -> ConfidenceCone {
    let segments = config.segments.max(1);
    let frame = LocalFrame::new(prediction.predicted_location);
    let total_weight: f64 = cloud.particles.iter().map(|p| p.weight).sum();
    if cloud.is_empty() || !(total_weight.is_finite() && total_weight > 0.0) {
        return ConfidenceCone::point(prediction.predicted_location, prediction.confidence);
    }

    // (weight, east, north, v_east, v_north) at the target time.
    let population: Vec<(f64, f64, f64, f64, f64)> = cloud
        .particles
        .iter()
        .map(|p| {
            let (east, north) = frame.to_local(p.point());
            (
                p.weight / total_weight,
                east,
                north,
                p.velocity_east_mps,
                p.velocity_north_mps,
            )
        })
        .collect();

    let (mean_ve, mean_vn) = population
        .iter()
        .fold((0.0, 0.0), |(e, n), &(w, _, _, ve, vn)| (e + w * ve, n + w * vn));
    let direction = unit_direction(mean_ve, mean_vn).unwrap_or((1.0, 0.0));
    let (ux, uy) = (-direction.1, direction.0);

    let horizon = seconds_between(start, cloud.last_update).max(0.0);
    let mut centers = Vec::with_capacity(segments + 1);
    let mut widths = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let back = horizon * (segments - i) as f64 / segments as f64;
        let positions = population
            .iter()
            .map(|&(w, e, n, ve, vn)| (w, e - ve * back, n - vn * back));

        let (mean_e, mean_n) = positions
            .clone()
            .fold((0.0, 0.0), |(me, mn), (w, e, n)| (me + w * e, mn + w * n));
        let cross_var: f64 = positions
            .map(|(w, e, n)| w * ((e - mean_e) * ux + (n - mean_n) * uy).powi(2))
            .sum();

        centers.push((mean_e, mean_n));
        widths.push(config.sigma_multiplier * cross_var.max(0.0).sqrt());
    }

    widen(&mut widths, config.min_half_width_m);
    let directions = vec![direction; centers.len()];
    assemble_local(&frame, &centers, &directions, widths, prediction.confidence)
}
