// Single source of truth for all default values.

// --- Prediction ---
pub const DEFAULT_HORIZON_MINUTES: f64 = 5.0;
pub const DEFAULT_MIN_HISTORY_ENTRIES: usize = 2;
pub const DEFAULT_MAX_HISTORY_AGE_MINUTES: f64 = 30.0;

// --- History ---
pub const DEFAULT_MAX_SAMPLES_PER_PEER: usize = 200;
pub const DEFAULT_RETENTION_MINUTES: f64 = 60.0;

// --- Classifier ---
pub const DEFAULT_STATIONARY_MAX_SPEED_MPS: f64 = 0.5;
pub const DEFAULT_WALKING_MAX_SPEED_MPS: f64 = 2.5;
pub const DEFAULT_HIGHWAY_MIN_SPEED_MPS: f64 = 22.0; // ~80 km/h
pub const DEFAULT_HIGHWAY_MAX_HEADING_STD_DEG: f64 = 12.0;
pub const DEFAULT_BOATING_MAX_SPEED_MPS: f64 = 12.0;
pub const DEFAULT_BOATING_MAX_SPEED_CV: f64 = 0.2;
pub const DEFAULT_BOATING_MIN_STRAIGHTNESS: f64 = 0.8;
pub const DEFAULT_UNKNOWN_NOISE_SCALE: f64 = 2.5;

// --- Kalman ---
pub const DEFAULT_REANCHOR_DISTANCE_M: f64 = 5_000.0;
pub const DEFAULT_MEASUREMENT_NOISE_M: f64 = 15.0;
pub const DEFAULT_BASE_ACCEL_STD_MPS2: f64 = 0.1;
pub const DEFAULT_INITIAL_VELOCITY_STD_MPS: f64 = 15.0;
pub const DEFAULT_CONFIDENCE_TRACE_CEILING_M2: f64 = 2_000_000.0; // (1 km)^2 per axis

// --- Particle ---
pub const DEFAULT_PARTICLE_COUNT: usize = 500;
pub const DEFAULT_RESAMPLE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_ACCURACY_M: f64 = 20.0;
pub const DEFAULT_CONFIDENCE_SPREAD_CEILING_M: f64 = 1_500.0;
pub const DEFAULT_ROUGHENING_M: f64 = 1.0;

// --- Linear ---
pub const DEFAULT_LINEAR_CONFIDENCE_TAU_SECS: f64 = 900.0; // 15 minutes
pub const DEFAULT_LINEAR_MAX_CONFIDENCE: f64 = 0.9;

// --- Cone ---
pub const DEFAULT_CONE_SEGMENTS: usize = 12;
pub const DEFAULT_MIN_HALF_WIDTH_M: f64 = 5.0;
pub const DEFAULT_HEADING_UNCERTAINTY_DEG: f64 = 15.0;
pub const DEFAULT_MAX_HEADING_UNCERTAINTY_DEG: f64 = 75.0;
pub const DEFAULT_SIGMA_MULTIPLIER: f64 = 2.0;

// --- Engine ---
pub const DEFAULT_REPROJECTION_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 10;
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;
pub const DEFAULT_DEGRADATION_LOG_CAPACITY: usize = 1_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
