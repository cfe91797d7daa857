//! Synthetic location tracks shared by the meshtrack test suites.
//!
//! Every generator is deterministic: the same arguments always produce the
//! same samples, so property tests and golden assertions stay stable.

use chrono::{DateTime, Duration, TimeZone, Utc};
use meshtrack_core::geo::destination;
use meshtrack_core::models::{GeoPoint, LocationSample, PeerLocationHistory};

/// Fixed reference instant for tests: 2024-01-01T00:00:00Z.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A point in a quiet part of the map (Helsinki harbour).
pub fn origin() -> GeoPoint {
    GeoPoint::new(60.1600, 24.9500)
}

/// Constant speed and bearing, one sample every `interval_secs`.
pub fn straight_track(
    peer_id: &str,
    start: GeoPoint,
    bearing_deg: f64,
    speed_mps: f64,
    interval_secs: i64,
    count: usize,
    t0: DateTime<Utc>,
) -> Vec<LocationSample> {
    (0..count)
        .map(|i| {
            let elapsed = interval_secs * i as i64;
            let p = destination(start, bearing_deg, speed_mps * elapsed as f64);
            LocationSample::new(peer_id, p.latitude, p.longitude, t0 + Duration::seconds(elapsed))
                .with_accuracy(5.0)
        })
        .collect()
}

/// Highway driving: 30 m/s due east, one sample every 10 s.
pub fn highway_track(peer_id: &str, count: usize, t0: DateTime<Utc>) -> Vec<LocationSample> {
    straight_track(peer_id, origin(), 90.0, 30.0, 10, count, t0)
}

/// Walking at 1.3 m/s, turning ±70° every step.
pub fn zigzag_walk(peer_id: &str, count: usize, t0: DateTime<Utc>) -> Vec<LocationSample> {
    let mut point = origin();
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        samples.push(
            LocationSample::new(
                peer_id,
                point.latitude,
                point.longitude,
                t0 + Duration::seconds(10 * i as i64),
            )
            .with_accuracy(8.0),
        );
        let heading = if i % 2 == 0 { 20.0 } else { 160.0 };
        point = destination(point, heading, 13.0);
    }
    samples
}

/// A parked peer whose reports wander by well under a meter.
pub fn stationary_jitter(peer_id: &str, count: usize, t0: DateTime<Utc>) -> Vec<LocationSample> {
    let center = origin();
    (0..count)
        .map(|i| {
            let wobble = (i as f64 * 1.7).sin() * 0.2;
            let p = destination(center, (i as f64 * 97.0) % 360.0, wobble.abs());
            LocationSample::new(peer_id, p.latitude, p.longitude, t0 + Duration::seconds(30 * i as i64))
                .with_accuracy(4.0)
        })
        .collect()
}

/// Two samples one degree of latitude apart, `secs` seconds apart, starting at (0, 0).
pub fn one_degree_north(peer_id: &str, secs: i64, t0: DateTime<Utc>) -> Vec<LocationSample> {
    vec![
        LocationSample::new(peer_id, 0.0, 0.0, t0),
        LocationSample::new(peer_id, 1.0, 0.0, t0 + Duration::seconds(secs)),
    ]
}

/// Wrap samples in a history. Panics on unordered input, which is a test bug.
pub fn history_from(peer_id: &str, samples: Vec<LocationSample>) -> PeerLocationHistory {
    PeerLocationHistory::from_samples(peer_id, samples)
        .unwrap_or_else(|e| panic!("fixture samples for {peer_id} are not ordered: {e}"))
}

/// Timestamp of the newest sample, or the epoch for an empty slice.
pub fn last_time(samples: &[LocationSample]) -> DateTime<Utc> {
    samples.last().map(|s| s.timestamp).unwrap_or_else(epoch)
}
