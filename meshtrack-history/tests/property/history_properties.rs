use chrono::Duration;
use meshtrack_core::config::HistoryConfig;
use meshtrack_core::models::LocationSample;
use meshtrack_history::HistoryStore;
use proptest::prelude::*;
use test_fixtures::epoch;

proptest! {
    #[test]
    fn history_is_always_ordered_and_bounded(
        offsets in prop::collection::vec(0i64..10_000, 1..120),
        max_samples in 2usize..40,
    ) {
        let store = HistoryStore::new(HistoryConfig {
            max_samples_per_peer: max_samples,
            retention_minutes: 60.0,
        });
        let mut accepted = 0usize;
        let mut newest = None;
        for offset in offsets {
            let t = epoch() + Duration::seconds(offset);
            let result = store.record(LocationSample::new("p", 10.0, 20.0, t));
            // Accepted iff not older than the newest sample so far.
            let expected_ok = newest.map_or(true, |n| t >= n);
            prop_assert_eq!(result.is_ok(), expected_ok);
            if expected_ok {
                accepted += 1;
                newest = Some(t);
            }
        }

        let history = store.snapshot("p").unwrap();
        prop_assert!(history.len() <= max_samples);
        prop_assert!(history.len() <= accepted);
        let samples: Vec<_> = history.samples().collect();
        prop_assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        if let (Some(first), Some(last)) = (history.oldest(), history.latest()) {
            prop_assert!(last.timestamp - first.timestamp <= Duration::minutes(60));
        }
    }
}
