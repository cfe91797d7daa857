use meshtrack_core::geo::*;
use meshtrack_core::models::GeoPoint;
use proptest::prelude::*;

fn point() -> impl Strategy<Value = GeoPoint> {
    (-80.0f64..80.0, -179.9f64..179.9).prop_map(|(lat, lon)| GeoPoint::new(lat, lon))
}

proptest! {
    #[test]
    fn haversine_is_symmetric_and_non_negative(a in point(), b in point()) {
        let ab = haversine_distance_m(a, b);
        let ba = haversine_distance_m(b, a);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn destination_travels_the_requested_distance(
        a in point(),
        bearing in 0.0f64..360.0,
        distance in 0.0f64..50_000.0,
    ) {
        let b = destination(a, bearing, distance);
        prop_assert!(b.is_valid());
        prop_assert!((haversine_distance_m(a, b) - distance).abs() < 1e-3);
    }

    #[test]
    fn bearings_are_normalized(a in point(), b in point()) {
        let bearing = initial_bearing_deg(a, b);
        prop_assert!((0.0..360.0).contains(&bearing));
    }

    #[test]
    fn local_frame_round_trips(
        origin in point(),
        east in -5_000.0f64..5_000.0,
        north in -5_000.0f64..5_000.0,
    ) {
        let frame = LocalFrame::new(origin);
        let (e, n) = frame.to_local(frame.to_geodetic(east, north));
        prop_assert!((e - east).abs() < 1e-4);
        prop_assert!((n - north).abs() < 1e-4);
    }
}
