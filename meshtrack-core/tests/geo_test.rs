use meshtrack_core::geo::*;
use meshtrack_core::models::GeoPoint;

#[test]
fn one_degree_of_latitude_is_about_111_km() {
    let d = haversine_distance_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
    assert!((d - 111_195.0).abs() < 5.0, "{d}");
}

#[test]
fn cardinal_bearings() {
    let o = GeoPoint::new(0.0, 0.0);
    assert!(initial_bearing_deg(o, GeoPoint::new(1.0, 0.0)).abs() < 1e-9);
    assert!((initial_bearing_deg(o, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
    assert!((initial_bearing_deg(o, GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
    assert!((initial_bearing_deg(o, GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
}

#[test]
fn destination_inverts_distance_and_bearing() {
    let start = GeoPoint::new(60.16, 24.95);
    let end = destination(start, 33.0, 12_345.0);
    assert!((haversine_distance_m(start, end) - 12_345.0).abs() < 1e-3);
    assert!((initial_bearing_deg(start, end) - 33.0).abs() < 1e-6);
}

#[test]
fn destination_crosses_the_antimeridian() {
    let start = GeoPoint::new(0.0, 179.9);
    let end = destination(start, 90.0, 30_000.0);
    assert!(end.longitude < -179.0, "{end:?}");
    assert!((haversine_distance_m(start, end) - 30_000.0).abs() < 1e-3);
}

#[test]
fn normalization_helpers() {
    assert_eq!(normalize_bearing(-90.0), 270.0);
    assert_eq!(normalize_bearing(720.0), 0.0);
    assert_eq!(normalize_longitude(190.0), -170.0);
    assert!((bearing_of(1.0, 0.0) - 90.0).abs() < 1e-12);
    assert!((bearing_of(0.0, -1.0) - 180.0).abs() < 1e-12);
}

#[test]
fn local_frame_round_trip_near_origin() {
    let frame = LocalFrame::new(GeoPoint::new(48.85, 2.35));
    let p = frame.to_geodetic(1_200.0, -800.0);
    let (e, n) = frame.to_local(p);
    assert!((e - 1_200.0).abs() < 1e-6);
    assert!((n + 800.0).abs() < 1e-6);
    assert_eq!(frame.to_local(frame.origin()), (0.0, 0.0));
}

#[test]
fn local_frame_agrees_with_haversine_at_short_range() {
    let origin = GeoPoint::new(60.16, 24.95);
    let frame = LocalFrame::new(origin);
    let target = destination(origin, 45.0, 2_000.0);
    let (e, n) = frame.to_local(target);
    assert!((e.hypot(n) - 2_000.0).abs() < 2.0);
}
