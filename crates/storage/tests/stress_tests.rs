//! Stress tests for the storage backends
//!
//! Randomised workloads checked against the reference model, plus large
//! workloads marked `#[ignore]`.
//!
//! Run the slow ones with: cargo test --release -- --ignored

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rand::prelude::*;
use rand::rngs::StdRng;
use scorekeep_core::{LeaderboardStore, Limits};
use scorekeep_storage::testing::ReferenceModel;
use scorekeep_storage::{JsonFileStore, MemoryStore, SqliteStore, DEFAULT_LOCK_TIMEOUT};
use tempfile::tempdir;

fn random_workload(store: &dyn LeaderboardStore, seed: u64, ops: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut model = ReferenceModel::new();
    let levels: Vec<String> = (0..6).map(|i| format!("level-{}", i)).collect();

    for i in 0..ops {
        let level = &levels[rng.gen_range(0..levels.len())];
        if rng.gen_bool(0.7) {
            // Millisecond resolution with a narrow range: many ties
            let time = rng.gen_range(0..2_000) as f64 / 1000.0;
            let name = format!("player-{}", rng.gen_range(0..20));
            store.append(level, &name, time).unwrap();
            model.append(level, &name, time);
        } else {
            let limit = rng.gen_range(1..=25);
            let top = store.top(level, limit).unwrap();
            let mismatches = model.compare_top(level, limit, &top);
            assert!(
                mismatches.is_empty(),
                "op {} on {}: {:?}",
                i,
                level,
                mismatches
            );
        }
    }

    assert_eq!(store.levels().unwrap(), model.levels());
    for level in &levels {
        assert_eq!(store.count(level).unwrap(), model.count(level));
    }
}

#[test]
fn test_random_ops_memory() {
    for seed in 0..5 {
        random_workload(&MemoryStore::new(), seed, 2_000);
    }
}

#[test]
fn test_random_ops_sqlite() {
    let store = SqliteStore::open_in_memory(Limits::default()).unwrap();
    random_workload(&store, 42, 2_000);
}

#[test]
fn test_random_ops_json() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(
        dir.path().join("scores.json"),
        Limits::default(),
        DEFAULT_LOCK_TIMEOUT,
        false,
    )
    .unwrap();
    random_workload(&store, 7, 500);
}

#[test]
fn test_many_levels_do_not_contend() {
    let store = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let level = format!("level-{}", t);
                for i in 0..1_000 {
                    store.append(&level, "p", (i % 97) as f64).unwrap();
                    if i % 50 == 0 {
                        assert!(!store.top(&level, 10).unwrap().is_empty());
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.levels().unwrap().len(), 8);
    for t in 0..8 {
        assert_eq!(store.count(&format!("level-{}", t)).unwrap(), 1_000);
    }
}

/// Test a single level with 1 million entries
///
/// Top-N must stay fast: the heap is bounded by the limit, not the level size.
#[test]
#[ignore] // Run with: cargo test --release -- --ignored test_one_million_entries
fn test_one_million_entries() {
    let store = MemoryStore::new();
    let start = Instant::now();
    for i in 0..1_000_000u64 {
        let time = ((i * 7_919) % 1_000_003) as f64 / 100.0;
        store.append("big", "p", time).unwrap();
        if i > 0 && i % 100_000 == 0 {
            println!("Appended {} entries in {:?}", i, start.elapsed());
        }
    }

    let start = Instant::now();
    let top = store.top("big", 100).unwrap();
    println!("top(100) over 1M entries took {:?}", start.elapsed());

    assert_eq!(top.len(), 100);
    assert_eq!(top[0].time_seconds(), 0.0);
    assert!(top.windows(2).all(|w| w[0].time() <= w[1].time()));
}

#[test]
#[ignore] // Run with: cargo test --release -- --ignored test_sqlite_bulk_appends
fn test_sqlite_bulk_appends() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(
        dir.path().join("scores.db"),
        Limits::default(),
        DEFAULT_LOCK_TIMEOUT,
        false,
    )
    .unwrap();

    let start = Instant::now();
    for i in 0..50_000u64 {
        store
            .append(&format!("level-{}", i % 10), "p", (i % 1_000) as f64)
            .unwrap();
    }
    println!("50K appends took {:?}", start.elapsed());

    assert_eq!(store.count("level-3").unwrap(), 5_000);
    assert_eq!(store.top("level-3", 10).unwrap().len(), 10);
}
