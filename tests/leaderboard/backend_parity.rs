//! Every backend answers the same workload identically

use crate::common::{names, open_backend, AllBackends, Backend};
use scorekeep::StoreError;
use tempfile::TempDir;

fn workload(all: &AllBackends) {
    let times = [12.5, 9.3, 9.3, 30.0, 0.0, 7.75, 9.3, 100.0, 0.5, 12.5, 3.0, 8.0];
    for (i, t) in times.iter().enumerate() {
        let level = if i % 3 == 0 { "castle" } else { "forest" };
        all.append(level, &format!("player{}", i % 5), *t);
    }
}

#[test]
fn backends_agree_on_top_n() {
    let all = AllBackends::open();
    workload(&all);

    let (_, reference) = &all.stores[0];
    for level in ["castle", "forest", "unplayed"] {
        for limit in [1, 3, 10, 100] {
            let expected = reference.top(level, limit).unwrap();
            for (backend, store) in &all.stores[1..] {
                assert_eq!(
                    store.top(level, limit).unwrap(),
                    expected,
                    "{} differs on {} limit {}",
                    backend,
                    level,
                    limit
                );
            }
        }
    }

    for (backend, store) in &all.stores {
        assert_eq!(
            store.levels().unwrap(),
            vec!["castle".to_string(), "forest".to_string()],
            "{}",
            backend
        );
        assert_eq!(store.count("forest").unwrap(), 8, "{}", backend);
        // Duplicate (level, name) submissions accumulate
        assert_eq!(
            names(store.as_ref(), "forest", 3),
            vec!["player4", "player3", "player0"],
            "{}",
            backend
        );
    }
}

#[test]
fn backends_agree_on_rejections() {
    let all = AllBackends::open();
    let long_name = "n".repeat(65);
    for (backend, store) in &all.stores {
        for (level, name, time) in [
            ("", "alice", 1.0),
            ("lvl1", long_name.as_str(), 1.0),
            ("lvl1", "alice", -0.001),
            ("lvl1", "alice", f64::NEG_INFINITY),
        ] {
            let err = store.append(level, name, time).unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)), "{}: {:?}", backend, err);
        }
        assert!(store.top("lvl1", 0).unwrap_err().is_validation(), "{}", backend);
        assert!(store.top("lvl1", 101).unwrap_err().is_validation(), "{}", backend);
        assert!(store.levels().unwrap().is_empty(), "{}", backend);
    }
}

#[test]
fn durable_backends_agree_after_reopen() {
    for backend in [Backend::Json, Backend::Sqlite] {
        let dir = TempDir::new().unwrap();
        {
            let store = open_backend(backend, dir.path());
            store.append("lvl1", "alice", 12.5).unwrap();
            store.append("lvl1", "bob", 9.3).unwrap();
            store.append("lvl1", "carol", 9.3).unwrap();
        }

        let store = open_backend(backend, dir.path());
        assert_eq!(
            names(store.as_ref(), "lvl1", 10),
            vec!["bob", "carol", "alice"],
            "{}",
            backend
        );
        store.append("lvl1", "dave", 1.0).unwrap();
        assert_eq!(store.count("lvl1").unwrap(), 4);
    }
}

#[test]
fn each_backend_passes_conformance() {
    for backend in [Backend::Memory, Backend::Json, Backend::Sqlite] {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let dir = TempDir::new().unwrap();
        scorekeep_storage::testing::conformance::run_all(|| {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            let sub = dir.path().join(n.to_string());
            std::fs::create_dir_all(&sub).unwrap();
            open_backend(backend, &sub)
        });
    }
}
