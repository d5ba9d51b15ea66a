//! The dynamic k-d forest: a Bentley-Saxe-style array of static balanced
//! k-d trees, amortizing insertion to `O(log^2 n)` while still answering
//! nearest-neighbor queries against every live point (§4.C).
//!
//! Slot `k` (when occupied) always holds a tree built from exactly the
//! points carried into it at the time of the last cascade or compaction
//! that touched it; the classic invariant "slot `k` has either 0 or
//! `2^k` points" holds for a forest that has never had a removal, and is
//! restored on the fly whenever [`KdForest::compact`] runs.

mod node;
mod tree;

use crate::error::{ErrorKind, Result};
use crate::geometry::Coord;
use tree::Tree;

/// A stable reference to one stored point. Every cascade or compaction
/// that relocates a point hands back its new handle, so callers never
/// need to chase a moved node themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle {
    pub slot: usize,
    pub idx: usize,
}

/// The result of [`KdForest::insert`]: the handle for the point just
/// inserted, plus the new handle of every other point the same cascade
/// relocated (empty if the new point landed in a previously-empty slot).
#[derive(Debug, Clone)]
pub struct InsertReport {
    pub handle: NodeHandle,
    pub relocated: Vec<(usize, NodeHandle)>,
}

#[derive(Default)]
pub struct KdForest {
    slots: Vec<Option<Tree>>,
    live: usize,
    tombstones: usize,
}

impl KdForest {
    pub fn new() -> Self {
        KdForest {
            slots: Vec::new(),
            live: 0,
            tombstones: 0,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Inserts `point` (standing in for pixel `payload`), cascading
    /// through slots 0, 1, 2, ... for as long as they're occupied,
    /// gathering each one's live points and dropping its tombstones,
    /// until an empty slot absorbs the merged batch.
    pub fn insert(&mut self, point: Coord, payload: usize) -> InsertReport {
        let mut gathered = vec![(point, payload)];
        let mut slot = 0;
        while slot < self.slots.len() && self.slots[slot].is_some() {
            let tree = self.slots[slot].take().unwrap();
            self.tombstones -= tree.tombstone_count();
            gathered.extend(tree.live_points());
            slot += 1;
        }
        if slot == self.slots.len() {
            self.slots.push(None);
        }

        log::debug!("rebuild slot {}: n={}", slot, gathered.len());
        let (tree, handles) = Tree::build(gathered);
        let mut relocated = Vec::with_capacity(handles.len().saturating_sub(1));
        let mut handle = NodeHandle { slot, idx: 0 };
        for (p, idx) in handles {
            let h = NodeHandle { slot, idx };
            if p == payload {
                handle = h;
            } else {
                relocated.push((p, h));
            }
        }
        self.slots[slot] = Some(tree);
        self.live += 1;
        InsertReport { handle, relocated }
    }

    /// Tombstones the point at `handle`. Returns the relocation list from
    /// a compaction if the tombstone ratio crossed 50% and triggered one,
    /// `None` otherwise.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<Vec<(usize, NodeHandle)>> {
        if let Some(Some(tree)) = self.slots.get_mut(handle.slot) {
            tree.mark_deleted(handle.idx);
        }
        self.live -= 1;
        self.tombstones += 1;
        if self.should_compact() {
            Some(self.compact())
        } else {
            None
        }
    }

    fn should_compact(&self) -> bool {
        let total = self.live + self.tombstones;
        total > 0 && self.tombstones * 2 > total
    }

    /// Gathers every live point across all slots and redistributes them
    /// by the binary decomposition of the live count: slot `k` gets a
    /// fresh tree of exactly `2^k` points whenever bit `k` of the live
    /// count is set.
    pub fn compact(&mut self) -> Vec<(usize, NodeHandle)> {
        log::debug!(
            "full compaction: size={} size_est={}",
            self.live,
            self.live + self.tombstones
        );
        let mut all_live = Vec::with_capacity(self.live);
        for slot in self.slots.drain(..) {
            if let Some(tree) = slot {
                all_live.extend(tree.live_points());
            }
        }
        self.tombstones = 0;
        let live_count = all_live.len();
        let highest = if live_count == 0 {
            0
        } else {
            63 - (live_count as u64).leading_zeros() as usize
        };
        self.slots = vec![None; highest + 1];

        let mut relocated = Vec::with_capacity(live_count);
        let mut offset = 0;
        for slot in 0..=highest {
            let size = 1usize << slot;
            if live_count & size != 0 {
                let chunk = all_live[offset..offset + size].to_vec();
                offset += size;
                let (tree, handles) = Tree::build(chunk);
                for (p, idx) in handles {
                    relocated.push((p, NodeHandle { slot, idx }));
                }
                self.slots[slot] = Some(tree);
            }
        }
        relocated
    }

    /// Finds the live point closest to `query` across every slot.
    pub fn nearest(&self, query: &Coord) -> Result<(NodeHandle, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for (slot_idx, slot) in self.slots.iter().enumerate() {
            if let Some(tree) = slot {
                if let Some((idx, dist_sq)) = tree.nearest(query) {
                    if best.map_or(true, |(_, _, best_d)| dist_sq < best_d) {
                        best = Some((slot_idx, idx, dist_sq));
                    }
                }
            }
        }
        match best {
            Some((slot, idx, dist_sq)) => {
                let payload = self.slots[slot].as_ref().unwrap().payload_at(idx);
                Ok((NodeHandle { slot, idx }, payload, dist_sq))
            }
            None => Err(ErrorKind::EmptyForest.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forest_errors_on_nearest() {
        let forest = KdForest::new();
        assert!(forest.nearest(&Coord::new(0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn sequential_inserts_fill_slots_by_binary_decomposition() {
        let mut forest = KdForest::new();
        for i in 0..16 {
            forest.insert(Coord::new(i as f64, 0.0, 0.0), i);
        }
        // 16 = 2^4, so every point should have cascaded into slot 4 alone.
        assert_eq!(forest.live_count(), 16);
        assert!(forest.slots[4].is_some());
        for slot in &forest.slots[..4] {
            assert!(slot.is_none());
        }
    }

    #[test]
    fn remove_then_compact_keeps_every_surviving_point_findable() {
        let mut forest = KdForest::new();
        let mut handles = Vec::new();
        for i in 0..1024 {
            let report = forest.insert(Coord::new(i as f64, 0.0, 0.0), i);
            handles.push(report.handle);
            for (payload, new_handle) in report.relocated {
                handles[payload] = new_handle;
            }
        }
        for i in 0..513 {
            let moved = forest.remove(handles[i]);
            if let Some(relocated) = moved {
                for (payload, new_handle) in relocated {
                    handles[payload] = new_handle;
                }
            }
        }
        assert_eq!(forest.live_count(), 1024 - 513);
        for i in 513..1024 {
            let (handle, payload, dist_sq) = forest.nearest(&Coord::new(i as f64, 0.0, 0.0)).unwrap();
            assert_eq!(payload, i);
            assert_eq!(dist_sq, 0.0);
            assert_eq!(handle, handles[i]);
        }
    }
}
