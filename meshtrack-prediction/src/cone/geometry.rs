use meshtrack_core::geo::{destination, haversine_distance_m, normalize_bearing, LocalFrame};
use meshtrack_core::models::{ConfidenceCone, GeoPoint};

/// Floor every half-width at `min` and make the sequence non-decreasing.
/// Non-finite entries inherit the running value.
pub fn widen(half_widths: &mut [f64], min: f64) {
    let mut running = min.max(0.0);
    for width in half_widths.iter_mut() {
        if width.is_finite() {
            running = running.max(*width);
        }
        *width = running;
    }
}

/// Unit vector along (east, north), or `None` for a near-zero vector.
pub fn unit_direction(east: f64, north: f64) -> Option<(f64, f64)> {
    let norm = east.hypot(north);
    (norm.is_finite() && norm > 1e-6).then(|| (east / norm, north / norm))
}

/// Cone from local-frame centers and travel directions.
///
/// The left boundary sits on the left-hand normal of each direction.
pub fn assemble_local(
    frame: &LocalFrame,
    centers: &[(f64, f64)],
    directions: &[(f64, f64)],
    half_widths: Vec<f64>,
    confidence_level: f64,
) -> ConfidenceCone {
    let mut center_line = Vec::with_capacity(centers.len());
    let mut left_boundary = Vec::with_capacity(centers.len());
    let mut right_boundary = Vec::with_capacity(centers.len());

    for ((&(east, north), &(de, dn)), &width) in
        centers.iter().zip(directions).zip(&half_widths)
    {
        center_line.push(frame.to_geodetic(east, north));
        left_boundary.push(frame.to_geodetic(east - dn * width, north + de * width));
        right_boundary.push(frame.to_geodetic(east + dn * width, north - de * width));
    }

    finish(center_line, left_boundary, right_boundary, half_widths, confidence_level)
}

/// Cone from geodetic centers and the travel bearing at each of them.
pub fn assemble_geodesic(
    centers: Vec<GeoPoint>,
    bearings: &[f64],
    half_widths: Vec<f64>,
    confidence_level: f64,
) -> ConfidenceCone {
    let (left_boundary, right_boundary): (Vec<GeoPoint>, Vec<GeoPoint>) = centers
        .iter()
        .zip(bearings)
        .zip(&half_widths)
        .map(|((&center, &bearing), &width)| {
            (
                destination(center, normalize_bearing(bearing - 90.0), width),
                destination(center, normalize_bearing(bearing + 90.0), width),
            )
        })
        .unzip();

    finish(centers, left_boundary, right_boundary, half_widths, confidence_level)
}

fn finish(
    center_line: Vec<GeoPoint>,
    left_boundary: Vec<GeoPoint>,
    right_boundary: Vec<GeoPoint>,
    half_widths_m: Vec<f64>,
    confidence_level: f64,
) -> ConfidenceCone {
    let max_distance_m = match (center_line.first(), center_line.last()) {
        (Some(&first), Some(&last)) => haversine_distance_m(first, last),
        _ => 0.0,
    };
    ConfidenceCone {
        center_line,
        left_boundary,
        right_boundary,
        half_widths_m,
        confidence_level: confidence_level.clamp(0.0, 1.0),
        max_distance_m,
    }
}
