//! Backend conformance suite
//!
//! Every `LeaderboardStore` implementation must pass these checks. Each check
//! panics with a descriptive message on failure, so backends call them from
//! ordinary `#[test]` functions:
//!
//! ```ignore
//! #[test]
//! fn test_conformance_suite() {
//!     conformance::run_all(|| Arc::new(MemoryStore::new()));
//! }
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use scorekeep_core::{LeaderboardStore, StoreError, DEFAULT_TOP_LIMIT};

use super::ReferenceModel;

fn names<S: LeaderboardStore + ?Sized>(store: &S, level_id: &str, limit: usize) -> Vec<String> {
    store
        .top(level_id, limit)
        .unwrap()
        .iter()
        .map(|e| e.player_name().to_string())
        .collect()
}

/// Run every check, each against a fresh store from `factory`
pub fn run_all<S, F>(factory: F)
where
    S: LeaderboardStore + ?Sized + 'static,
    F: Fn() -> Arc<S>,
{
    check_example_ordering(factory().as_ref());
    check_empty_level(factory().as_ref());
    check_limit_respected(factory().as_ref());
    check_ties_keep_insertion_order(factory().as_ref());
    check_top_is_idempotent(factory().as_ref());
    check_rejected_input_not_persisted(factory().as_ref());
    check_levels_are_isolated(factory().as_ref());
    check_matches_reference_model(factory().as_ref());
    check_concurrent_appends(factory(), "race", 8, 10);
    check_readers_see_consistent_views(factory(), "mixed", 4, 25);
}

/// alice 12.5, bob 9.3 -> [bob, alice]
pub fn check_example_ordering<S: LeaderboardStore + ?Sized>(store: &S) {
    store.append("lvl1", "alice", 12.5).unwrap();
    store.append("lvl1", "bob", 9.3).unwrap();

    let top = store.top_default("lvl1").unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].player_name(), "bob");
    assert_eq!(top[0].time_seconds(), 9.3);
    assert_eq!(top[0].level_id(), "lvl1");
    assert_eq!(top[1].player_name(), "alice");
    assert_eq!(top[1].time_seconds(), 12.5);
}

/// Unknown levels are empty, not errors
pub fn check_empty_level<S: LeaderboardStore + ?Sized>(store: &S) {
    assert!(store.top("never-played", DEFAULT_TOP_LIMIT).unwrap().is_empty());
    assert_eq!(store.count("never-played").unwrap(), 0);
    assert!(store.levels().unwrap().is_empty());
}

/// 50 appends, `top(10)` returns the 10 fastest
pub fn check_limit_respected<S: LeaderboardStore + ?Sized>(store: &S) {
    for i in 0..50 {
        // Descending times so the fastest entries are the last ones written
        store
            .append("lvl1", &format!("p{:02}", i), 100.0 - i as f64)
            .unwrap();
    }

    let top = store.top("lvl1", 10).unwrap();
    assert_eq!(top.len(), 10);
    let expected: Vec<String> = (40..50).rev().map(|i| format!("p{:02}", i)).collect();
    assert_eq!(names(store, "lvl1", 10), expected);

    assert_eq!(store.top("lvl1", 1).unwrap().len(), 1);
    assert_eq!(store.count("lvl1").unwrap(), 50);

    let err = store.top("lvl1", 0).unwrap_err();
    assert!(err.is_validation(), "limit 0 must be rejected, got {:?}", err);
}

/// Equal times rank in submission order, on every read
pub fn check_ties_keep_insertion_order<S: LeaderboardStore + ?Sized>(store: &S) {
    store.append("lvl1", "first", 5.0).unwrap();
    store.append("lvl1", "second", 5.0).unwrap();
    store.append("lvl1", "fastest", 1.0).unwrap();
    store.append("lvl1", "third", 5.0).unwrap();
    store.append("lvl1", "first", 5.0).unwrap();

    let expected = vec!["fastest", "first", "second", "third", "first"];
    for _ in 0..3 {
        assert_eq!(names(store, "lvl1", 10), expected);
    }
}

/// Two reads with no append in between are identical
pub fn check_top_is_idempotent<S: LeaderboardStore + ?Sized>(store: &S) {
    for (i, t) in [3.0, 1.5, 7.25, 1.5, 0.0].iter().enumerate() {
        store.append("lvl1", &format!("p{}", i), *t).unwrap();
    }
    let a = store.top("lvl1", 10).unwrap();
    let b = store.top("lvl1", 10).unwrap();
    assert_eq!(a, b);
    for pair in a.windows(2) {
        assert!(pair[0].time_seconds() <= pair[1].time_seconds());
    }
}

/// Bad input fails with `Validation` and leaves the store unchanged
pub fn check_rejected_input_not_persisted<S: LeaderboardStore + ?Sized>(store: &S) {
    store.append("lvl1", "alice", 10.0).unwrap();

    let too_long_level = "x".repeat(store.limits().max_level_id_bytes + 1);
    let too_long_name = "y".repeat(store.limits().max_player_name_bytes + 1);

    let bad: Vec<(&str, &str, f64)> = vec![
        ("", "bob", 1.0),
        ("  ", "bob", 1.0),
        ("lvl1", "", 1.0),
        ("lvl1", "bob", -1.0),
        ("lvl1", "bob", f64::NAN),
        ("lvl1", "bob", f64::INFINITY),
        (too_long_level.as_str(), "bob", 1.0),
        ("lvl1", too_long_name.as_str(), 1.0),
    ];
    for (level_id, name, time) in bad {
        let err = store.append(level_id, name, time).unwrap_err();
        assert!(
            matches!(err, StoreError::Validation(_)),
            "append({:?}, {:?}, {}) should fail validation, got {:?}",
            level_id,
            name,
            time,
            err
        );
    }

    assert_eq!(store.count("lvl1").unwrap(), 1);
    assert_eq!(store.levels().unwrap(), vec!["lvl1".to_string()]);
}

/// Entries never leak between levels
pub fn check_levels_are_isolated<S: LeaderboardStore + ?Sized>(store: &S) {
    store.append("b-level", "bob", 2.0).unwrap();
    store.append("a-level", "alice", 1.0).unwrap();
    store.append("b-level", "carol", 3.0).unwrap();

    assert_eq!(names(store, "a-level", 10), vec!["alice"]);
    assert_eq!(names(store, "b-level", 10), vec!["bob", "carol"]);
    assert_eq!(store.count("b-level").unwrap(), 2);
    assert_eq!(
        store.levels().unwrap(),
        vec!["a-level".to_string(), "b-level".to_string()]
    );
}

/// Deterministic mixed workload compared against [`ReferenceModel`]
pub fn check_matches_reference_model<S: LeaderboardStore + ?Sized>(store: &S) {
    let mut model = ReferenceModel::new();
    let levels = ["alpha", "beta", "gamma"];

    // 64-bit LCG, MMIX constants
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    for i in 0..120 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let level = levels[(state >> 33) as usize % levels.len()];
        // Coarse times force plenty of ties
        let time = ((state >> 40) % 16) as f64 * 0.25;
        let name = format!("p{}", i);

        store.append(level, &name, time).unwrap();
        model.append(level, &name, time);

        if i % 10 == 0 {
            for level in levels {
                for limit in [1, 3, 10] {
                    let actual = store.top(level, limit).unwrap();
                    let mismatches = model.compare_top(level, limit, &actual);
                    assert!(
                        mismatches.is_empty(),
                        "level {} limit {}: {:?}",
                        level,
                        limit,
                        mismatches
                    );
                }
            }
        }
    }

    for level in levels {
        assert_eq!(store.count(level).unwrap(), model.count(level));
    }
    assert_eq!(store.levels().unwrap(), model.levels());
}

/// `threads` writers append `per_thread` distinct entries each to one level;
/// none may be lost or duplicated
pub fn check_concurrent_appends<S>(store: Arc<S>, level_id: &str, threads: usize, per_thread: usize)
where
    S: LeaderboardStore + ?Sized + 'static,
{
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let level_id = level_id.to_string();
            thread::spawn(move || {
                barrier.wait();
                for j in 0..per_thread {
                    // Unique time per entry so the expected ranking is exact
                    let seq = t * per_thread + j;
                    store
                        .append(&level_id, &format!("t{}-{}", t, j), seq as f64 * 0.5)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let total = threads * per_thread;
    assert_eq!(store.count(level_id).unwrap(), total, "lost or duplicated writes");

    let limit = total.min(store.limits().max_top_limit);
    let top = store.top(level_id, limit).unwrap();
    assert_eq!(top.len(), limit);

    let mut seen = HashSet::new();
    for (rank, entry) in top.iter().enumerate() {
        assert!(seen.insert(entry.player_name().to_string()), "duplicate entry {:?}", entry);
        assert_eq!(entry.time_seconds(), rank as f64 * 0.5);
        let (t, j) = (rank / per_thread, rank % per_thread);
        assert_eq!(entry.player_name(), format!("t{}-{}", t, j));
    }
}

/// Readers running alongside writers only ever see sorted, growing results
pub fn check_readers_see_consistent_views<S>(
    store: Arc<S>,
    level_id: &str,
    writers: usize,
    per_writer: usize,
) where
    S: LeaderboardStore + ?Sized + 'static,
{
    let readers = 2;
    let barrier = Arc::new(Barrier::new(writers + readers));
    let mut handles = Vec::new();

    for w in 0..writers {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        let level_id = level_id.to_string();
        handles.push(thread::spawn(move || {
            barrier.wait();
            for j in 0..per_writer {
                let time = ((w * 7 + j * 3) % 11) as f64;
                store
                    .append(&level_id, &format!("w{}-{}", w, j), time)
                    .unwrap();
            }
        }));
    }

    let total = writers * per_writer;
    for _ in 0..readers {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        let level_id = level_id.to_string();
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut last_count = 0;
            loop {
                let count = store.count(&level_id).unwrap();
                assert!(count >= last_count, "count went backwards");
                last_count = count;

                let top = store.top(&level_id, DEFAULT_TOP_LIMIT).unwrap();
                assert!(top.len() <= DEFAULT_TOP_LIMIT);
                for pair in top.windows(2) {
                    assert!(pair[0].time_seconds() <= pair[1].time_seconds());
                }
                if count == total {
                    break;
                }
                thread::yield_now();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
    assert_eq!(store.count(level_id).unwrap(), total);
}
