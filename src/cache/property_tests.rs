//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's round-trip, counting, ordering and
//! deduplication behavior over generated inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use tokio_test::block_on;

use crate::cache::{EditOptions, OfflineCache};
use crate::storage::MemoryEngine;

// == Helpers ==
fn open_cache() -> OfflineCache<MemoryEngine> {
    let mut cache = OfflineCache::new(MemoryEngine::new(), "props", None);
    block_on(cache.open()).unwrap();
    cache
}

// == Strategies ==
/// Generates tile identifiers (non-empty)
fn src_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9/_.]{1,32}".prop_map(|s| s)
}

/// Generates arbitrary JSON payloads, nested a few levels deep
fn payload_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Generates a tile record with the given payload
fn tile(src: &str, payload: Value) -> Value {
    json!({ "src": src, "payload": payload })
}

/// Generates a sequence of tile operations for testing
#[derive(Debug, Clone)]
enum TileOp {
    Add { src: String },
    Remove { src: String },
}

fn tile_op_strategy() -> impl Strategy<Value = TileOp> {
    prop_oneof![
        src_strategy().prop_map(|src| TileOp::Add { src }),
        src_strategy().prop_map(|src| TileOp::Remove { src }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Storing a tile and reading it back by `src` returns an equal record.
    #[test]
    fn prop_tile_roundtrip(src in src_strategy(), payload in payload_strategy()) {
        let cache = open_cache();
        let record = tile(&src, payload);

        block_on(cache.add_tile(record.clone())).unwrap();
        let stored = block_on(cache.get_tile(&src)).unwrap();

        prop_assert_eq!(stored, Some(record));
    }

    // The tile count always equals the number of distinct keys added and not
    // removed since; removing an absent key leaves it unchanged.
    #[test]
    fn prop_tile_count_tracks_operations(ops in prop::collection::vec(tile_op_strategy(), 1..40)) {
        let cache = open_cache();
        let mut expected: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                TileOp::Add { src } => {
                    block_on(cache.add_tile(tile(&src, Value::Null))).unwrap();
                    expected.insert(src);
                }
                TileOp::Remove { src } => {
                    let key = block_on(cache.remove_tile(&src)).unwrap();
                    prop_assert_eq!(&key, &src);
                    expected.remove(&src);
                }
            }
            prop_assert_eq!(block_on(cache.tile_count()).unwrap(), expected.len());
        }
    }

    // With distinct timestamps, payloads come back in ascending timestamp order
    // regardless of insertion order.
    #[test]
    fn prop_edits_sorted_by_timestamp(
        timestamps in prop::collection::hash_set(-1_000_000i64..1_000_000, 1..30)
    ) {
        let cache = open_cache();
        let inserted: Vec<i64> = timestamps.into_iter().collect();

        for timestamp in &inserted {
            let options = EditOptions::append().with_timestamp(*timestamp);
            block_on(cache.add_edit(json!(timestamp), options)).unwrap();
        }

        let mut sorted = inserted.clone();
        sorted.sort_unstable();
        let expected: Vec<Value> = sorted.into_iter().map(Value::from).collect();

        prop_assert_eq!(block_on(cache.edits()).unwrap(), expected);
    }

    // Adding the same payload three times with dedup stores it once.
    #[test]
    fn prop_dedup_idempotent(payload in payload_strategy(), timestamp in any::<i64>()) {
        let cache = open_cache();
        let before = block_on(cache.edit_count()).unwrap();

        for _ in 0..3 {
            let options = EditOptions::default().with_timestamp(timestamp);
            let returned = block_on(cache.add_edit(payload.clone(), options)).unwrap();
            prop_assert_eq!(&returned, &payload);
        }

        prop_assert_eq!(block_on(cache.edit_count()).unwrap(), before + 1);
        prop_assert_eq!(block_on(cache.edits()).unwrap(), vec![payload]);
    }

    // Without dedup every call inserts its own envelope.
    #[test]
    fn prop_append_inserts_every_call(payload in payload_strategy(), copies in 1usize..10) {
        let cache = open_cache();

        for _ in 0..copies {
            block_on(cache.add_edit(payload.clone(), EditOptions::append())).unwrap();
        }

        let envelopes = block_on(cache.edit_envelopes()).unwrap();
        let keys: HashSet<&str> = envelopes.iter().map(|e| e.key.as_str()).collect();
        // Keys are random; a collision would merge two envelopes, which the
        // fragment length makes vanishingly unlikely at this size
        prop_assert_eq!(keys.len(), copies);
        prop_assert!(envelopes.iter().all(|e| e.edit == payload));
    }

    // Removing an absent edit succeeds and does not change the count.
    #[test]
    fn prop_remove_absent_edit(payloads in prop::collection::vec(payload_strategy(), 0..8), key in "[a-z]{1,8}") {
        let cache = open_cache();
        for payload in payloads {
            block_on(cache.add_edit(payload, EditOptions::append())).unwrap();
        }
        let before = block_on(cache.edit_count()).unwrap();

        // Generated keys always contain '_', these never do
        prop_assert_eq!(block_on(cache.remove_edit(&key)).unwrap(), key);
        prop_assert_eq!(block_on(cache.edit_count()).unwrap(), before);
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_timestamps_all_returned() {
        let cache = open_cache();

        for i in 0..5 {
            block_on(cache.add_edit(json!(i), EditOptions::append().with_timestamp(10))).unwrap();
        }
        block_on(cache.add_edit(json!("early"), EditOptions::append().with_timestamp(1))).unwrap();

        let edits = block_on(cache.edits()).unwrap();
        assert_eq!(edits.len(), 6);
        assert_eq!(edits[0], json!("early"));

        // Ties come back in some order, each payload exactly once
        let mut counts: HashMap<String, usize> = HashMap::new();
        for edit in &edits[1..] {
            *counts.entry(edit.to_string()).or_default() += 1;
        }
        assert_eq!(counts.len(), 5);
        assert!(counts.values().all(|&n| n == 1));
    }
}
