/// meshtrack version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mean Earth radius (IUGG), meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Kalman state dimension: [east, north, v_east, v_north].
pub const KALMAN_STATE_DIM: usize = 4;

/// Number of entries in the row-major Kalman covariance.
pub const KALMAN_COVARIANCE_LEN: usize = KALMAN_STATE_DIM * KALMAN_STATE_DIM;

/// Minimum number of samples the movement classifier needs.
pub const MIN_CLASSIFIER_SAMPLES: usize = 3;

/// Steps shorter than this (meters) carry no usable heading.
pub const MIN_HEADING_STEP_M: f64 = 0.5;

/// Fraction of the linear confidence used as the floor for Kalman and particle models.
pub const LINEAR_FLOOR_FACTOR: f64 = 0.5;

/// Milliseconds per second, for timestamp arithmetic.
pub const MILLIS_PER_SEC: f64 = 1_000.0;
