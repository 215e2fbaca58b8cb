use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::tile::TileRef;

/// Pending repaint: a tile plus its freshness key (step + jitter).
#[derive(Debug, Clone, Copy)]
struct StaleEntry {
    key: f64,
    seq: u64,
    tile: TileRef,
}

impl PartialEq for StaleEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StaleEntry {}

impl PartialOrd for StaleEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StaleEntry {
    // Reversed so the max-heap pops the oldest key first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue of tiles awaiting repaint. Duplicates are allowed.
pub struct StalenessQueue {
    heap: BinaryHeap<StaleEntry>,
    rng: SmallRng,
    max_jitter: f64,
    next_seq: u64,
}

impl StalenessQueue {
    pub fn new(seed: u64, max_jitter: f64) -> Self {
        Self {
            heap: BinaryHeap::new(),
            rng: SmallRng::seed_from_u64(seed),
            max_jitter,
            next_seq: 0,
        }
    }

    /// Queue `tile` as stale since simulation step `step`.
    pub fn enqueue(&mut self, tile: TileRef, step: u64) {
        let jitter = if self.max_jitter > 0.0 {
            self.rng.gen_range(0.0..self.max_jitter)
        } else {
            0.0
        };
        self.heap.push(StaleEntry {
            key: step as f64 + jitter,
            seq: self.next_seq,
            tile,
        });
        self.next_seq += 1;
    }

    /// Remove up to `n` of the oldest entries.
    pub fn drain(&mut self, n: usize) -> Vec<TileRef> {
        let n = n.min(self.heap.len());
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(entry) = self.heap.pop() else {
                break;
            };
            out.push(entry.tile);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
