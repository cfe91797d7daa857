//! Movement classifier: from recent history to a pattern and a noise scale.
//!
//! The noise scale is how erratic motion calibrates how fast predicted
//! uncertainty grows: Kalman process noise and particle velocity jitter are
//! both multiplied by it.
//!
//! ## Decision table
//!
//! | Condition (first match wins) | Pattern |
//! |------------------------------|---------|
//! | fewer than 3 samples / no usable step | UNKNOWN |
//! | mean speed < stationary max | STATIONARY |
//! | mean speed < walking max | WALKING_HIKING |
//! | mean speed ≥ highway min and heading std ≤ highway max | HIGHWAY_DRIVING |
//! | mean speed ≤ boating max, speed CV ≤ boating max, straightness ≥ boating min | BOATING |
//! | otherwise | URBAN_DRIVING |

use chrono::{DateTime, Duration, Utc};
use meshtrack_core::config::ClassifierConfig;
use meshtrack_core::constants::MIN_CLASSIFIER_SAMPLES;
use meshtrack_core::models::{LocationSample, MovementPattern, MovementProfile, PeerLocationHistory};

use crate::motion::MotionStatistics;

#[derive(Debug, Clone, Copy, Default)]
pub struct MovementClassifier {
    config: ClassifierConfig,
}

impl MovementClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the whole history.
    pub fn classify(&self, history: &PeerLocationHistory) -> MovementProfile {
        let samples: Vec<&LocationSample> = history.samples().collect();
        self.classify_samples(&samples)
    }

    /// Classify only the samples within `max_age` of `now`.
    pub fn classify_window(
        &self,
        history: &PeerLocationHistory,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> MovementProfile {
        let samples: Vec<&LocationSample> = history.window(max_age, now).collect();
        self.classify_samples(&samples)
    }

    pub fn classify_samples(&self, samples: &[&LocationSample]) -> MovementProfile {
        if samples.len() < MIN_CLASSIFIER_SAMPLES {
            return MovementProfile::unknown(self.config.unknown_noise_scale, samples.len());
        }
        let stats = match MotionStatistics::from_samples(samples) {
            Some(stats) if stats.steps >= 2 => stats,
            _ => return MovementProfile::unknown(self.config.unknown_noise_scale, samples.len()),
        };

        let pattern = self.decide(&stats);
        MovementProfile {
            pattern,
            noise_scale: noise_scale(pattern, &stats),
            mean_speed_mps: stats.mean_speed_mps,
            speed_variance: stats.speed_variance,
            heading_variance_deg2: stats.heading_variance_deg2(),
            straightness: stats.straightness,
            sample_count: samples.len(),
        }
    }

    fn decide(&self, stats: &MotionStatistics) -> MovementPattern {
        let c = &self.config;
        let speed = stats.mean_speed_mps;

        if speed < c.stationary_max_speed_mps {
            MovementPattern::Stationary
        } else if speed < c.walking_max_speed_mps {
            MovementPattern::WalkingHiking
        } else if speed >= c.highway_min_speed_mps
            && stats.heading_std_deg <= c.highway_max_heading_std_deg
        {
            MovementPattern::HighwayDriving
        } else if speed <= c.boating_max_speed_mps
            && stats.speed_cv() <= c.boating_max_speed_cv
            && stats.straightness >= c.boating_min_straightness
        {
            MovementPattern::Boating
        } else {
            MovementPattern::UrbanDriving
        }
    }
}

/// Pattern base scale × erratic factor in [1, 2].
fn noise_scale(pattern: MovementPattern, stats: &MotionStatistics) -> f64 {
    let heading_term = (stats.heading_std_deg / 90.0).min(1.0);
    let speed_term = stats.speed_cv().min(1.0);
    pattern.base_noise_scale() * (1.0 + 0.5 * heading_term + 0.5 * speed_term)
}
