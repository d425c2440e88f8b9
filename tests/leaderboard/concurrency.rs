//! Concurrent use of one shared store

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::common::{open_backend, Backend};
use scorekeep::ResultService;
use scorekeep_storage::testing::conformance;
use tempfile::TempDir;

#[test]
fn concurrent_appends_all_backends() {
    for backend in [Backend::Memory, Backend::Json, Backend::Sqlite] {
        let dir = TempDir::new().unwrap();
        let store = open_backend(backend, dir.path());
        conformance::check_concurrent_appends(store, "lvl1", 8, 12);
    }
}

#[test]
fn concurrent_submissions_through_service() {
    let dir = TempDir::new().unwrap();
    let service = ResultService::new(open_backend(Backend::Sqlite, dir.path()));

    let threads = 6;
    let per_thread = 5;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let service = service.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for j in 0..per_thread {
                    let time = format!("{}.{}", t, j);
                    service.submit("race", &format!("t{}-{}", t, j), &time).unwrap();
                    // Interleave reads with writes
                    let page = service.query("race", None).unwrap();
                    assert!(page.len() <= 10);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let levels = service.levels().unwrap();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].entries, threads * per_thread);

    let page = service.query("race", None).unwrap();
    let unique: HashSet<_> = page.iter().map(|s| s.name.clone()).collect();
    assert_eq!(unique.len(), 10);
    assert_eq!(page[0].name, "t0-0");
    assert_eq!(page[0].time, 0.0);
}
