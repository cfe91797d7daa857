//! Per-step motion statistics shared by the classifier and the linear model.

use chrono::{DateTime, Utc};
use meshtrack_core::constants::{MILLIS_PER_SEC, MIN_HEADING_STEP_M};
use meshtrack_core::geo::{haversine_distance_m, initial_bearing_deg, normalize_bearing};
use meshtrack_core::models::LocationSample;

/// Seconds from `from` to `to` (negative if `to` is earlier).
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_SEC
}

/// Speed, heading, and path-shape statistics over consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStatistics {
    pub mean_speed_mps: f64,
    pub speed_variance: f64,
    /// Circular mean of the step headings; `None` when no step moved far enough.
    pub mean_heading_deg: Option<f64>,
    pub heading_std_deg: f64,
    pub straightness: f64,
    /// Steps with a positive time delta.
    pub steps: usize,
    pub heading_steps: usize,
}

impl MotionStatistics {
    /// Compute statistics over ordered samples.
    ///
    /// Steps with a zero time delta are skipped; steps shorter than
    /// [`MIN_HEADING_STEP_M`] contribute a speed but no heading.
    /// Returns `None` when fewer than one usable step exists.
    pub fn from_samples(samples: &[&LocationSample]) -> Option<Self> {
        let mut speeds = Vec::with_capacity(samples.len());
        let mut headings = Vec::with_capacity(samples.len());
        let mut path_length = 0.0;

        for pair in samples.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let distance = haversine_distance_m(a.point(), b.point());
            path_length += distance;

            let dt = seconds_between(a.timestamp, b.timestamp);
            if dt <= 0.0 {
                continue;
            }
            speeds.push(distance / dt);
            if distance >= MIN_HEADING_STEP_M {
                headings.push(initial_bearing_deg(a.point(), b.point()));
            }
        }

        if speeds.is_empty() {
            return None;
        }

        let n = speeds.len() as f64;
        let mean_speed = speeds.iter().sum::<f64>() / n;
        let speed_variance = speeds.iter().map(|s| (s - mean_speed).powi(2)).sum::<f64>() / n;

        let (mean_heading, heading_std) = match circular_stats_deg(&headings) {
            Some((mean, std)) => (Some(mean), std),
            None => (None, 0.0),
        };

        let straightness = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if path_length > 1e-9 => {
                (haversine_distance_m(first.point(), last.point()) / path_length).clamp(0.0, 1.0)
            }
            _ => 0.0,
        };

        Some(Self {
            mean_speed_mps: mean_speed,
            speed_variance,
            mean_heading_deg: mean_heading,
            heading_std_deg: heading_std,
            straightness,
            steps: speeds.len(),
            heading_steps: headings.len(),
        })
    }

    pub fn heading_variance_deg2(&self) -> f64 {
        self.heading_std_deg * self.heading_std_deg
    }

    pub fn speed_cv(&self) -> f64 {
        if self.mean_speed_mps > f64::EPSILON {
            self.speed_variance.sqrt() / self.mean_speed_mps
        } else {
            0.0
        }
    }
}

/// Circular mean and standard deviation of bearings, degrees.
///
/// The std is `sqrt(-2 ln R)` for mean resultant length `R`, capped at 180°.
pub fn circular_stats_deg(bearings: &[f64]) -> Option<(f64, f64)> {
    if bearings.is_empty() {
        return None;
    }
    let n = bearings.len() as f64;
    let (sin_sum, cos_sum) = bearings.iter().fold((0.0, 0.0), |(s, c), b| {
        let r = b.to_radians();
        (s + r.sin(), c + r.cos())
    });
    let (mean_sin, mean_cos) = (sin_sum / n, cos_sum / n);
    let resultant = mean_sin.hypot(mean_cos).min(1.0);

    let mean = normalize_bearing(mean_sin.atan2(mean_cos).to_degrees());
    let std = if resultant <= 1e-12 {
        180.0
    } else {
        (-2.0 * resultant.ln()).max(0.0).sqrt().to_degrees().min(180.0)
    };
    Some((mean, std))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_mean_wraps_north() {
        let (mean, std) = circular_stats_deg(&[350.0, 10.0]).unwrap();
        assert!(mean < 1e-6 || (360.0 - mean) < 1e-6, "mean was {mean}");
        assert!(std > 5.0 && std < 15.0, "std was {std}");
    }

    #[test]
    fn identical_headings_have_zero_spread() {
        let (_, std) = circular_stats_deg(&[42.0, 42.0, 42.0]).unwrap();
        assert!(std < 1e-3);
    }

    #[test]
    fn opposite_headings_max_out() {
        let (_, std) = circular_stats_deg(&[0.0, 180.0]).unwrap();
        assert!((std - 180.0).abs() < 1e-9);
    }
}
