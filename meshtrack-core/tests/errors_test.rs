use chrono::{TimeZone, Utc};
use meshtrack_core::errors::*;

#[test]
fn history_errors_convert_into_tracking_error() {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let err: TrackingError = HistoryError::StaleSample {
        peer_id: "p".into(),
        timestamp: t,
        last_timestamp: t,
    }
    .into();
    assert!(matches!(err, TrackingError::History(HistoryError::StaleSample { .. })));
}

#[test]
fn prediction_error_messages_are_descriptive() {
    let err = PredictionError::InsufficientHistory {
        required: 2,
        available: 1,
    };
    let msg = err.to_string();
    assert!(msg.contains('2') && msg.contains('1'), "{msg}");

    let err = PredictionError::NumericalFailure {
        model: "KALMAN_FILTER".into(),
        detail: "nan".into(),
    };
    assert!(err.to_string().contains("KALMAN_FILTER"));
}

#[test]
fn transparent_errors_keep_the_inner_message() {
    let inner = ConfigError::InvalidValue {
        field: "cone.segments".into(),
        reason: "must be at least 1".into(),
    };
    let expected = inner.to_string();
    let outer: TrackingError = inner.into();
    assert_eq!(outer.to_string(), expected);
}

#[test]
fn serde_json_errors_convert() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: TrackingError = parse.into();
    assert!(matches!(err, TrackingError::Serialization(_)));
}
