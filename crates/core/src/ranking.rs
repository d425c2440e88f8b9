//! Top-N selection
//!
//! Leaderboards are ordered by completion time ascending, with ties broken by
//! insertion sequence (earlier submission ranks higher). [`top_n`] keeps a
//! bounded max-heap of size `limit`, so a query over `n` entries costs
//! O(n log limit) and never reorders equal times between calls.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::types::CompletionTime;

/// Heap slot: ordered by (time, seq), greatest = worst-ranked
#[derive(Debug)]
struct Ranked<T> {
    time: CompletionTime,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Slower time = Greater; later submission = Greater on a tie
        self.time
            .cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Select the `limit` fastest items
///
/// `items` yields `(time, seq, item)` where `seq` is the insertion sequence.
/// The result is sorted ascending by `(time, seq)`. A `limit` of zero returns
/// an empty vector.
pub fn top_n<T, I>(items: I, limit: usize) -> Vec<T>
where
    I: IntoIterator<Item = (CompletionTime, u64, T)>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Ranked<T>> = BinaryHeap::with_capacity(limit + 1);
    for (time, seq, item) in items {
        let candidate = Ranked { time, seq, item };
        if heap.len() < limit {
            heap.push(candidate);
            continue;
        }
        // Full: replace the current worst only if the candidate beats it
        if let Some(worst) = heap.peek() {
            if candidate < *worst {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_sorted_vec().into_iter().map(|r| r.item).collect()
}
