//! Property tests: ordering, limit, membership, idempotence

use proptest::prelude::*;
use scorekeep::{CompletionTime, LeaderboardStore, Limits, MemoryStore, SqliteStore};
use scorekeep_storage::testing::ReferenceModel;

const LEVELS: [&str; 3] = ["alpha", "beta", "gamma"];

/// (level index, time in quarter seconds): coarse times produce ties
fn ops() -> impl Strategy<Value = Vec<(usize, u32)>> {
    prop::collection::vec((0..LEVELS.len(), 0u32..40), 0..80)
}

fn check_store(store: &dyn LeaderboardStore, ops: &[(usize, u32)]) -> Result<(), TestCaseError> {
    let mut model = ReferenceModel::new();
    for (i, (level, quarters)) in ops.iter().enumerate() {
        let time = *quarters as f64 * 0.25;
        let name = format!("p{}", i);
        store.append(LEVELS[*level], &name, time).unwrap();
        model.append(LEVELS[*level], &name, time);
    }

    for level in LEVELS {
        for limit in [1, 5, 10] {
            let top = store.top(level, limit).unwrap();

            prop_assert!(top.len() <= limit);
            prop_assert!(top.windows(2).all(|w| w[0].time_seconds() <= w[1].time_seconds()));
            prop_assert_eq!(&top, &store.top(level, limit).unwrap());

            let mismatches = model.compare_top(level, limit, &top);
            prop_assert!(mismatches.is_empty(), "{} limit {}: {:?}", level, limit, mismatches);
        }
        prop_assert_eq!(store.count(level).unwrap(), model.count(level));
    }
    Ok(())
}

proptest! {
    #[test]
    fn memory_store_matches_model(ops in ops()) {
        check_store(&MemoryStore::new(), &ops)?;
    }

    #[test]
    fn sqlite_store_matches_model(ops in ops()) {
        let store = SqliteStore::open_in_memory(Limits::default()).unwrap();
        check_store(&store, &ops)?;
    }

    /// An appended entry is in the top N exactly when fewer than N entries
    /// rank ahead of it
    #[test]
    fn membership_follows_rank(
        before in prop::collection::vec(0u32..20, 0..30),
        probe in 0u32..20,
        after in prop::collection::vec(0u32..20, 0..30),
        limit in 1usize..=10,
    ) {
        let store = MemoryStore::new();
        for (i, t) in before.iter().enumerate() {
            store.append("lvl", &format!("b{}", i), *t as f64).unwrap();
        }
        store.append("lvl", "probe", probe as f64).unwrap();
        for (i, t) in after.iter().enumerate() {
            store.append("lvl", &format!("a{}", i), *t as f64).unwrap();
        }

        // Earlier entries win ties, later ones must be strictly faster
        let ahead = before.iter().filter(|t| **t <= probe).count()
            + after.iter().filter(|t| **t < probe).count();
        let present = store
            .top("lvl", limit)
            .unwrap()
            .iter()
            .any(|e| e.player_name() == "probe");
        prop_assert_eq!(present, ahead < limit);
    }

    /// A submission whose time does not parse leaves the store untouched
    #[test]
    fn unparseable_time_never_persists(raw in "\\PC{0,12}") {
        let store = std::sync::Arc::new(MemoryStore::new());
        let service = scorekeep::ResultService::new(store.clone());

        let result = service.submit("lvl", "alice", &raw);
        match CompletionTime::parse(&raw) {
            Ok(time) => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(store.top("lvl", 1).unwrap()[0].time(), time);
            }
            Err(_) => {
                prop_assert_eq!(result.unwrap_err().status().as_u16(), 400);
                prop_assert_eq!(store.count("lvl").unwrap(), 0);
            }
        }
    }
}
