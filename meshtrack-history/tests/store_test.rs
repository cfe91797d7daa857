use chrono::Duration;
use meshtrack_core::config::HistoryConfig;
use meshtrack_core::errors::HistoryError;
use meshtrack_core::models::LocationSample;
use meshtrack_history::HistoryStore;
use test_fixtures::{epoch, highway_track, last_time, origin};

#[test]
fn record_creates_peer_on_first_sample() {
    let store = HistoryStore::default();
    assert!(!store.contains("alpha"));
    for sample in highway_track("alpha", 3, epoch()) {
        store.record(sample).unwrap();
    }
    assert!(store.contains("alpha"));
    assert_eq!(store.peer_count(), 1);
    assert_eq!(store.sample_count(), 3);
}

#[test]
fn stale_sample_is_rejected_and_history_unchanged() {
    let store = HistoryStore::default();
    let track = highway_track("alpha", 3, epoch());
    for sample in track.iter().cloned() {
        store.record(sample).unwrap();
    }
    let before = store.snapshot("alpha").unwrap();

    let stale = track[0].clone();
    let err = store.record(stale).unwrap_err();
    assert!(matches!(err, HistoryError::StaleSample { .. }));
    assert_eq!(store.snapshot("alpha").unwrap(), before);
}

#[test]
fn invalid_sample_never_creates_a_peer() {
    let store = HistoryStore::default();
    let bad = LocationSample::new("ghost", 123.0, 0.0, epoch());
    assert!(matches!(
        store.record(bad),
        Err(HistoryError::InvalidSample { .. })
    ));
    assert!(!store.contains("ghost"));
}

#[test]
fn count_bound_evicts_oldest_first() {
    let store = HistoryStore::new(HistoryConfig {
        max_samples_per_peer: 4,
        ..HistoryConfig::default()
    });
    let track = highway_track("alpha", 10, epoch());
    let evicted: usize = track
        .iter()
        .cloned()
        .map(|s| store.record(s).unwrap())
        .sum();
    assert_eq!(evicted, 6);
    let history = store.snapshot("alpha").unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history.oldest().unwrap().timestamp, track[6].timestamp);
}

#[test]
fn history_for_returns_only_the_window() {
    let store = HistoryStore::default();
    let track = highway_track("alpha", 10, epoch());
    for sample in track.iter().cloned() {
        store.record(sample).unwrap();
    }
    let window = store
        .history_for("alpha", Duration::seconds(30), last_time(&track))
        .unwrap();
    assert_eq!(window.len(), 4);
    assert!(store.history_for("nobody", Duration::minutes(1), epoch()).is_none());
}

#[test]
fn with_history_reads_without_copying() {
    let store = HistoryStore::default();
    for sample in highway_track("alpha", 5, epoch()) {
        store.record(sample).unwrap();
    }
    let len = store.with_history("alpha", |h| h.len());
    assert_eq!(len, Some(5));
    assert_eq!(store.with_history("nobody", |h| h.len()), None);
}

#[test]
fn prune_evicts_idle_peers_only() {
    let store = HistoryStore::default();
    let t0 = epoch();
    store
        .record(LocationSample::new("old", origin().latitude, origin().longitude, t0))
        .unwrap();
    store
        .record(LocationSample::new(
            "fresh",
            origin().latitude,
            origin().longitude,
            t0 + Duration::minutes(50),
        ))
        .unwrap();

    let evicted = store.prune(t0 + Duration::minutes(55), Duration::minutes(30));
    assert_eq!(evicted, vec!["old".to_string()]);
    assert!(store.contains("fresh"));
    assert!(!store.contains("old"));
}

#[test]
fn forget_removes_everything() {
    let store = HistoryStore::default();
    for sample in highway_track("alpha", 2, epoch()) {
        store.record(sample).unwrap();
    }
    assert_eq!(store.forget("alpha").map(|h| h.len()), Some(2));
    assert!(store.forget("alpha").is_none());
    assert_eq!(store.peer_ids(), Vec::<String>::new());
}
