//! Property tests for ReactiveSlot delivery semantics.

use proptest::prelude::*;
use spark_components::{signal_slot, slot, slot_with_value};
use std::sync::{Arc, Mutex};

fn values() -> impl Strategy<Value = Vec<u8>> {
    // Small alphabet so repeated values are common.
    proptest::collection::vec(0u8..4, 0..64)
}

fn dedup_consecutive(values: &[u8], start: Option<u8>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut last = start;
    for &v in values {
        if last != Some(v) {
            out.push(v);
            last = Some(v);
        }
    }
    out
}

proptest! {
    #[test]
    fn unobserved_slot_keeps_last_value(seq in values()) {
        let s = slot::<u8>();
        for &v in &seq {
            s.set_value(v);
        }
        prop_assert_eq!(s.peek(), seq.last().copied());
        prop_assert_eq!(s.delivery_count(), 0);
    }

    #[test]
    fn observed_slot_delivers_only_distinct_values(seq in values()) {
        let s = slot::<u8>();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _h = s.subscribe(move |v| sink.lock().unwrap().push(*v)).unwrap();

        for &v in &seq {
            s.set_value(v);
        }

        prop_assert_eq!(seen.lock().unwrap().clone(), dedup_consecutive(&seq, None));
    }

    #[test]
    fn pre_seeded_slot_delivers_seed_then_changes(seed in 0u8..4, seq in values()) {
        let s = slot_with_value(seed);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _h = s.subscribe(move |v| sink.lock().unwrap().push(*v)).unwrap();

        for &v in &seq {
            s.set_value(v);
        }

        let mut expected = vec![seed];
        expected.extend(dedup_consecutive(&seq, Some(seed)));
        prop_assert_eq!(seen.lock().unwrap().clone(), expected);
    }

    #[test]
    fn observed_signal_slot_delivers_every_value_and_ends_empty(seq in values()) {
        let s = signal_slot::<u8>();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _h = s.subscribe(move |v| sink.lock().unwrap().push(*v)).unwrap();

        for &v in &seq {
            s.set_value(v);
        }

        prop_assert_eq!(seen.lock().unwrap().clone(), seq);
        prop_assert_eq!(s.peek(), None);
    }

    #[test]
    fn second_observe_always_fails(seq in values()) {
        let s = slot::<u8>();
        for &v in &seq {
            s.set_value(v);
        }
        let _h = s.subscribe(|_| {}).unwrap();
        let second = s.subscribe(|_| {});
        prop_assert!(second.is_err());
    }
}
