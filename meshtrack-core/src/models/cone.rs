use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Renderable uncertainty envelope around a predicted path.
///
/// `center_line`, `left_boundary`, `right_boundary` and `half_widths_m` all
/// have the same length; index 0 is the last known position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCone {
    pub center_line: Vec<GeoPoint>,
    pub left_boundary: Vec<GeoPoint>,
    pub right_boundary: Vec<GeoPoint>,
    /// Half-width at each center-line point, meters. Non-decreasing.
    pub half_widths_m: Vec<f64>,
    pub confidence_level: f64,
    /// Distance from the first to the last center-line point, meters.
    pub max_distance_m: f64,
}

impl ConfidenceCone {
    /// Degenerate cone for a prediction with nothing to project.
    pub fn point(location: GeoPoint, confidence_level: f64) -> Self {
        Self {
            center_line: vec![location],
            left_boundary: vec![location],
            right_boundary: vec![location],
            half_widths_m: vec![0.0],
            confidence_level,
            max_distance_m: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.center_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.center_line.is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        let n = self.center_line.len();
        n > 0
            && self.left_boundary.len() == n
            && self.right_boundary.len() == n
            && self.half_widths_m.len() == n
    }

    pub fn is_widening(&self) -> bool {
        self.half_widths_m.windows(2).all(|w| w[1] >= w[0])
    }
}
