//! Heading-spread cone: half-width grows as `distance × tan(heading uncertainty)`.

use meshtrack_core::config::ConeConfig;
use meshtrack_core::geo::{destination, haversine_distance_m, initial_bearing_deg, normalize_bearing};
use meshtrack_core::models::{ConfidenceCone, LocationPrediction, LocationSample};

use super::geometry::{assemble_geodesic, widen};

/// Largest usable spread angle; `tan` diverges at 90°.
const MAX_SPREAD_DEG: f64 = 89.0;

pub fn cone(
    config: &ConeConfig,
    prediction: &LocationPrediction,
    last_known: Option<&LocationSample>,
) -> ConfidenceCone {
    let segments = config.segments.max(1);
    let end = prediction.predicted_location;
    let start = last_known.map_or(end, LocationSample::point);
    let total = haversine_distance_m(start, end);
    let moving = total > 1e-6;

    let heading = if moving {
        initial_bearing_deg(start, end)
    } else {
        prediction.velocity.map_or(0.0, |v| v.heading_deg)
    };
    let uncertainty = prediction
        .velocity
        .map_or(config.default_heading_uncertainty_deg, |v| v.heading_uncertainty_deg)
        .min(config.max_heading_uncertainty_deg)
        .clamp(0.0, MAX_SPREAD_DEG);
    let spread = uncertainty.to_radians().tan();

    let mut centers = Vec::with_capacity(segments + 1);
    let mut bearings = Vec::with_capacity(segments + 1);
    let mut widths = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let distance = total * i as f64 / segments as f64;
        let center = if i == segments {
            end
        } else {
            destination(start, heading, distance)
        };
        let bearing = match (moving, i == segments) {
            (false, _) => heading,
            (true, false) => initial_bearing_deg(center, end),
            (true, true) => normalize_bearing(initial_bearing_deg(end, start) + 180.0),
        };
        centers.push(center);
        bearings.push(bearing);
        widths.push(config.min_half_width_m + distance * spread);
    }

    widen(&mut widths, config.min_half_width_m);
    assemble_geodesic(centers, &bearings, widths, prediction.confidence)
}
