//! Binary heap of item handles over the registry.
//!
//! Every item records its own heap slot, so an arbitrary member can be
//! unlinked in O(log n) without scanning the heap.

use std::cmp::Ordering;

use crate::config::Comparator;
use crate::registry::{ItemId, Registry, Side};

pub(crate) struct Partition {
    side: Side,
    heap: Vec<ItemId>,
}

impl Partition {
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            heap: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns the extreme element: maximum for `Lower`, minimum for `Upper`.
    #[inline]
    pub fn peek(&self) -> Option<ItemId> {
        self.heap.first().copied()
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.heap
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn push<V>(&mut self, items: &mut Registry<V>, cmp: Comparator<V>, id: ItemId) {
        let pos = self.heap.len();
        self.heap.push(id);

        let item = items.live_mut(id);
        item.side = self.side;
        item.heap_pos = pos;

        self.sift_up(items, cmp, pos);
    }

    pub fn pop<V>(&mut self, items: &mut Registry<V>, cmp: Comparator<V>) -> Option<ItemId> {
        let id = self.peek()?;
        self.unlink(items, cmp, 0);
        Some(id)
    }

    /// Removes `id` from the heap.
    ///
    /// Returns `false` if the item is not a member of this partition.
    pub fn remove<V>(&mut self, items: &mut Registry<V>, cmp: Comparator<V>, id: ItemId) -> bool {
        let Some(item) = items.get(id) else {
            return false;
        };
        let pos = item.heap_pos;
        if item.side != self.side || self.heap.get(pos) != Some(&id) {
            return false;
        }

        self.unlink(items, cmp, pos);
        true
    }

    fn unlink<V>(&mut self, items: &mut Registry<V>, cmp: Comparator<V>, pos: usize) {
        let Some(last) = self.heap.pop() else {
            return;
        };
        if pos == self.heap.len() {
            return;
        }

        self.heap[pos] = last;
        items.live_mut(last).heap_pos = pos;

        // The moved element may belong either above or below its new slot.
        self.sift_down(items, cmp, pos);
        self.sift_up(items, cmp, pos);
    }

    /// Whether `a` must sit closer to the root than `b`.
    #[inline]
    fn precedes<V>(&self, items: &Registry<V>, cmp: Comparator<V>, a: ItemId, b: ItemId) -> bool {
        let ord = cmp(&items.live(a).value, &items.live(b).value);
        match self.side {
            Side::Lower => ord == Ordering::Greater,
            Side::Upper => ord == Ordering::Less,
        }
    }

    fn sift_up<V>(&mut self, items: &mut Registry<V>, cmp: Comparator<V>, pos: usize) {
        let id = self.heap[pos];
        let mut hole = pos;

        while hole > 0 {
            let parent = (hole - 1) / 2;
            let parent_id = self.heap[parent];
            if !self.precedes(items, cmp, id, parent_id) {
                break;
            }

            self.heap[hole] = parent_id;
            items.live_mut(parent_id).heap_pos = hole;
            hole = parent;
        }

        if hole != pos {
            self.heap[hole] = id;
            items.live_mut(id).heap_pos = hole;
        }
    }

    fn sift_down<V>(&mut self, items: &mut Registry<V>, cmp: Comparator<V>, pos: usize) {
        let len = self.heap.len();
        let id = self.heap[pos];
        let mut hole = pos;

        loop {
            let left = 2 * hole + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let child = if right < len && self.precedes(items, cmp, self.heap[right], self.heap[left])
            {
                right
            } else {
                left
            };

            let child_id = self.heap[child];
            if !self.precedes(items, cmp, child_id, id) {
                break;
            }

            self.heap[hole] = child_id;
            items.live_mut(child_id).heap_pos = hole;
            hole = child;
        }

        if hole != pos {
            self.heap[hole] = id;
            items.live_mut(id).heap_pos = hole;
        }
    }

    /// Checks heap order and recorded positions.
    pub fn is_consistent<V>(&self, items: &Registry<V>, cmp: Comparator<V>) -> bool {
        self.heap.iter().enumerate().all(|(pos, &id)| {
            let Some(item) = items.get(id) else {
                return false;
            };
            let parent_ok = pos == 0 || !self.precedes(items, cmp, id, self.heap[(pos - 1) / 2]);
            item.side == self.side && item.heap_pos == pos && parent_ok
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn cmp(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    fn drain(partition: &mut Partition, items: &mut Registry<i32>) -> Vec<i32> {
        let mut result = Vec::new();
        while let Some(id) = partition.pop(items, cmp) {
            result.push(items.remove(id).unwrap().value);
        }
        result
    }

    #[test]
    fn lower_pops_in_descending_order() {
        let mut items = Registry::new();
        let mut lower = Partition::new(Side::Lower);
        for value in [4, 8, 1, 8, 3, 9, 0] {
            let id = items.insert(value, Side::Lower);
            lower.push(&mut items, cmp, id);
        }
        assert!(lower.is_consistent(&items, cmp));

        assert_eq!(drain(&mut lower, &mut items), [9, 8, 8, 4, 3, 1, 0]);
        assert_eq!(lower.len(), 0);
    }

    #[test]
    fn upper_removes_arbitrary_members() {
        let mut items = Registry::new();
        let mut upper = Partition::new(Side::Upper);
        let ids = [15, 3, 7, 11, 5, 20, 1]
            .into_iter()
            .map(|value| {
                let id = items.insert(value, Side::Upper);
                upper.push(&mut items, cmp, id);
                id
            })
            .collect::<Vec<_>>();

        assert!(upper.remove(&mut items, cmp, ids[1]));
        items.remove(ids[1]).unwrap();
        assert!(upper.remove(&mut items, cmp, ids[5]));
        items.remove(ids[5]).unwrap();
        assert!(upper.is_consistent(&items, cmp));

        // Already gone.
        assert!(!upper.remove(&mut items, cmp, ids[1]));

        assert_eq!(drain(&mut upper, &mut items), [1, 5, 7, 11, 15]);
    }

    #[test]
    fn foreign_members_are_rejected() {
        let mut items = Registry::new();
        let mut lower = Partition::new(Side::Lower);
        let mut upper = Partition::new(Side::Upper);

        let a = items.insert(1, Side::Lower);
        lower.push(&mut items, cmp, a);
        let b = items.insert(2, Side::Upper);
        upper.push(&mut items, cmp, b);

        assert!(!lower.remove(&mut items, cmp, b));
        assert!(!upper.remove(&mut items, cmp, a));
        assert_eq!(lower.len(), 1);
        assert_eq!(upper.len(), 1);
    }

    #[test]
    fn random_removals_keep_heap_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut items = Registry::new();
        let mut lower = Partition::new(Side::Lower);

        let mut live = Vec::new();
        for _ in 0..2000 {
            if live.is_empty() || rng.random_bool(0.6) {
                let id = items.insert(rng.random_range(-50..50), Side::Lower);
                lower.push(&mut items, cmp, id);
                live.push(id);
            } else {
                let id = live.swap_remove(rng.random_range(0..live.len()));
                assert!(lower.remove(&mut items, cmp, id));
                items.remove(id).unwrap();
            }
            assert!(lower.is_consistent(&items, cmp));
        }

        let mut expected = live
            .iter()
            .map(|id| items.get(*id).unwrap().value)
            .collect::<Vec<_>>();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(drain(&mut lower, &mut items), expected);
    }
}
