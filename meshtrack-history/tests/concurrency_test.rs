use std::sync::Arc;
use std::thread;

use chrono::Duration;
use meshtrack_core::models::LocationSample;
use meshtrack_history::HistoryStore;
use test_fixtures::{epoch, origin};

#[test]
fn parallel_appends_for_distinct_peers_are_all_kept() {
    let store = Arc::new(HistoryStore::default());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let peer = format!("peer-{worker}");
                for i in 0..50 {
                    let sample = LocationSample::new(
                        peer.clone(),
                        origin().latitude,
                        origin().longitude,
                        epoch() + Duration::seconds(i),
                    );
                    store.record(sample).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.peer_count(), 8);
    assert_eq!(store.sample_count(), 400);
}

#[test]
fn concurrent_writers_on_one_peer_never_reorder() {
    let store = Arc::new(HistoryStore::default());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut accepted = 0;
                for i in 0..100 {
                    let sample = LocationSample::new(
                        "shared",
                        origin().latitude,
                        origin().longitude,
                        epoch() + Duration::seconds(i * 4 + worker),
                    );
                    if store.record(sample).is_ok() {
                        accepted += 1;
                    }
                }
                accepted
            })
        })
        .collect();
    let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let history = store.snapshot("shared").unwrap();
    assert_eq!(history.len(), accepted.min(200));
    let ordered = history
        .samples()
        .zip(history.samples().skip(1))
        .all(|(a, b)| a.timestamp <= b.timestamp);
    assert!(ordered);
}
